use crate::config::ShieldConfig;
use crate::decode::Decoder;
use crate::error::Result;

use super::Profile;

pub fn run(config: &ShieldConfig, text: &str, profile: Profile) -> Result<()> {
    let decoder = match profile {
        Profile::Url => Decoder::new(config.url_decoder()),
        Profile::Shield => Decoder::new(config.shield_decoder()),
    };
    let decoded = decoder.decode(text);
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}
