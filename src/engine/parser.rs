use regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    // Example: "/pescar" or "/comprar Vara Intermediária"
    static ref COMMAND_PATTERN: Regex = Regex::new(r"^(/\S+)(?:\s+(.+?))?\s*$").unwrap();
}

/// Every command the game understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fish,
    ShowInventory,
    Sell,
    ShowShop,
    Buy(String),
    ShowRanking,
    Unknown,
}

impl Command {
    /// Whether the command needs the player's record at all.
    pub fn touches_state(&self) -> bool {
        !matches!(self, Command::ShowRanking | Command::Unknown)
    }
}

/// Messages that are not addressed to the bot start with anything but `/`.
pub fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

/// Parses a chat message into a [`Command`].
///
/// The command word is case-insensitive. The `/comprar` argument keeps its
/// case since it must match a shop item name exactly.
pub fn parse_command(text: &str) -> Command {
    let caps = match COMMAND_PATTERN.captures(text.trim()) {
        Some(caps) => caps,
        None => return Command::Unknown,
    };

    let word = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
    let arg = caps.get(2).map(|m| m.as_str().trim());

    match (word.as_str(), arg) {
        ("/pescar", None) => Command::Fish,
        ("/inventario", None) => Command::ShowInventory,
        ("/vender", None) => Command::Sell,
        ("/loja", None) => Command::ShowShop,
        ("/ranking", None) => Command::ShowRanking,
        ("/comprar", Some(item)) if !item.is_empty() => Command::Buy(item.to_string()),
        _ => Command::Unknown,
    }
}
