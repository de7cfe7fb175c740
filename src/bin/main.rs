fn main() {
  explorer::main();
}
