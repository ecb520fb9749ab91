use clap::Parser;
use pm2insomnia::{
    cli::{Cli, Commands, RulesCommand},
    commands::{self, ConvertCommandArgs},
    converters::ConvertOptions,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose);

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            config,
            no_preprocess,
            no_postprocess,
            experimental,
            format,
        } => {
            let args = ConvertCommandArgs {
                inputs,
                output_dir: output,
                config,
                options: ConvertOptions {
                    preprocess: !no_preprocess,
                    postprocess: !no_postprocess,
                    experimental,
                },
                format,
            };

            let report = commands::execute_convert(&args).await?;
            if !report.is_success() {
                anyhow::bail!(
                    "{} of {} file(s) failed to convert",
                    report.failed.len(),
                    report.total()
                );
            }
        }
        Commands::Rules { command } => match command {
            RulesCommand::List { config } => {
                commands::execute_rules_list(config.as_deref())?;
            }
            RulesCommand::Export { output, config } => {
                commands::execute_rules_export(output.as_deref(), config.as_deref())?;
            }
        },
    }

    Ok(())
}
