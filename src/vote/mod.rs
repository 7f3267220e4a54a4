pub(crate) mod assign;
pub(crate) mod checks;
pub(crate) mod cleanup;
pub(crate) mod create_channel;
pub(crate) mod discord_helpers;
pub(crate) mod pacer;
pub(crate) mod provision;
pub(crate) mod sample;
