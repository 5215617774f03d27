use annomark::{
  cli::{Cli, Commands},
  commands,
};
use annomark_config::Config;
use annomark_parser::DocumentParser;
use color_eyre::eyre::{Context, Result};
use log::{LevelFilter, debug};

#[allow(clippy::print_stdout, reason = "Command output goes to stdout")]
fn emit(output: &str) {
  if output.ends_with('\n') {
    print!("{output}");
  } else {
    println!("{output}");
  }
}

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during config loading
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;
  debug!("Effective configuration: {config:?}");

  match cli.command {
    Commands::Parse {
      inputs,
      section,
      pretty,
      jobs,
    } => {
      config.pretty |= pretty;
      if jobs.is_some() {
        config.jobs = jobs;
      }

      // Setup thread pool once for the batch
      let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
      rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build_global()?;

      let parser = DocumentParser::new(config.parser_options());
      emit(&commands::parse(
        &parser,
        &inputs,
        section.as_deref(),
        config.pretty,
      )?);
    },

    Commands::Frontmatter { input, pretty } => {
      config.pretty |= pretty;
      let parser = DocumentParser::new(config.parser_options());
      emit(&commands::frontmatter(&parser, &input, config.pretty)?);
    },

    Commands::Fmt {
      input,
      sort_keys,
      in_place,
    } => {
      config.sort_keys |= sort_keys;
      if in_place {
        commands::check_in_place_target(&input)?;
      }

      let parser = DocumentParser::new(config.parser_options());
      let formatted = commands::format_document(
        &parser,
        &input,
        config.serialize_options(),
      )?;
      if in_place {
        commands::write_in_place(&input, &formatted)?;
      } else {
        emit(&formatted);
      }
    },

    Commands::Fields { input } => {
      let parser = DocumentParser::new(config.parser_options());
      emit(&commands::fields(&parser, &input)?);
    },
  }

  Ok(())
}
