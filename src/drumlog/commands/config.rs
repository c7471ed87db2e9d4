use crate::commands::{CmdMessage, CmdResult, DataPaths};
use crate::config::DrumlogConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Unknown keys and rejected values come back as error messages. Only a
/// config file that cannot be read or written is an `Err`.
pub fn run(paths: &DataPaths, action: ConfigAction) -> Result<CmdResult> {
    let mut config = DrumlogConfig::load(&paths.data_dir)?;
    let mut result = CmdResult::default();

    match action {
        ConfigAction::ShowAll => return Ok(result.with_config(config)),
        ConfigAction::ShowKey(key) => result.add_message(match config.get(&key) {
            Some(value) => CmdMessage::info(value),
            None => CmdMessage::error(format!("Unknown config key: {}", key)),
        }),
        ConfigAction::Set(key, value) => {
            if let Err(e) = config.set(&key, &value) {
                result.add_message(CmdMessage::error(e.to_string()));
                return Ok(result);
            }
            config.save(&paths.data_dir)?;
            let shown = config.get(&key).unwrap_or(value);
            result.add_message(CmdMessage::success(format!("{} set to {}", key, shown)));
            result = result.with_config(config);
        }
    }
    Ok(result)
}
