use flexi_logger::{FileSpec, Logger, LoggerHandle};

pub fn configure_logger(level: &str) -> LoggerHandle {
    Logger::try_with_str(format!("renoster_cli={0},renoster={0}", level))
        .unwrap()
        .log_to_file(FileSpec::default().suppress_timestamp().directory("/tmp"))
        .format(flexi_logger::opt_format)
        .start()
        .unwrap_or_else(|e| panic!("Failed to initialize logger: {}", e))
}
