use std::{fmt, sync::Arc};

const TARGET: &str = "signalfx_reporter";

/// Where the reporter's own messages go.
#[derive(Clone, Default)]
pub enum Logger {
    /// The global `log` facade, under the `signalfx_reporter` target
    #[default]
    Facade,
    /// A logger of your own
    Custom(Arc<dyn log::Log>),
    /// Nowhere
    Disabled,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facade => write!(f, "Facade"),
            Self::Custom(_) => f.debug_tuple("Custom").finish(),
            Self::Disabled => write!(f, "Disabled"),
        }
    }
}

impl Logger {
    pub(crate) fn log(&self, level: log::Level, args: fmt::Arguments<'_>) {
        match self {
            Logger::Facade => log::log!(target: TARGET, level, "{args}"),
            Logger::Custom(logger) => {
                let metadata = log::Metadata::builder()
                    .level(level)
                    .target(TARGET)
                    .build();
                if logger.enabled(&metadata) {
                    logger.log(
                        &log::Record::builder()
                            .metadata(metadata)
                            .args(args)
                            .module_path(Some(module_path!()))
                            .build(),
                    );
                }
            }
            Logger::Disabled => (),
        }
    }
}
