use {super::*, clap::ValueEnum};

pub mod get;
pub mod index;
pub mod settings;

#[derive(Debug, Parser)]
pub enum Subcommand {
  #[command(about = "Print a document from the index")]
  Get(get::Get),
  #[command(subcommand, about = "Index commands")]
  Index(index::IndexSubcommand),
  #[command(about = "Print resolved settings")]
  Settings,
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Get(get) => get.run(settings),
      Self::Index(index) => index.run(settings),
      Self::Settings => settings::run(settings),
    }
  }
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub type SubcommandResult = Result<Option<Box<dyn Output>>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}
