use crate::APP_NAME;
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Metadata, Profile, Provider,
};

#[derive(Parser, Debug)]
#[clap(version)]
pub struct Args {
    /// Overrides the path to the config file
    #[clap(short, long, default_value_t = format!("/etc/{}/config.toml", APP_NAME))]
    pub cfg: String,
    /// Overrides the log-level set in the config file. Must be "error",
    /// "warn", "info", "debug" or "trace".
    #[clap(short, long)]
    pub log_level: Option<String>,
    /// Run against the in-tree mock collaborators instead of board hardware.
    #[clap(long)]
    pub mock: bool,
}

impl Provider for Args {
    fn metadata(&self) -> Metadata {
        Metadata::named("program argument(s)").interpolater(|_, path| match path {
            ["general", "log_level"] => String::from("-l/--log-level"),
            _ => unreachable!(),
        })
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut general = Map::new();
        if let Some(l) = &self.log_level {
            general.insert(String::from("log_level"), Value::from(l.clone()));
        }
        let mut vals = Map::new();
        vals.insert(String::from("general"), Value::from(general));
        let mut map = Map::new();
        map.insert(Profile::Global, vals);
        Ok(map)
    }
}

pub fn args() -> Args {
    Args::parse()
}
