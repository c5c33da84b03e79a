pub(crate) mod date;
pub(crate) mod logging;
pub(crate) mod timezone;

pub(crate) use date::parse_instant;
pub(crate) use logging::init_logging;
pub(crate) use timezone::Timezone;
