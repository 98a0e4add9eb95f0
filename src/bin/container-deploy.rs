use clap::Parser;
use container_deploy::commands::{CommandArgs, ContainerDeployArgs, ContainerDeployCommand};
use container_deploy_process_management::logging::Logger;

fn main() {
    let args = ContainerDeployArgs::parse();

    if let Err(e) = Logger::new()
        .filter_level(args.verbosity.log_level_filter())
        .log_out_dir(args.log_out.clone())
        .init()
    {
        eprintln!("Failed to set up logging: {e:?}");
    }

    log::trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Deploy(mut command) => command.run(),

        CommandArgs::SyncDefaults(mut command) => command.run(),

        CommandArgs::Tag(mut command) => command.run(),
    }
}
