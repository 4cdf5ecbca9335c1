use serde::Deserialize;

// Error body returned with non-2xx responses
#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    pub text: String,
}

// Items
#[derive(Deserialize, Clone, Debug)]
pub struct Item {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub rarity: String,
    pub level: u32,
    pub vendor_value: u64,
    pub icon: Option<String>,
    pub chat_link: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    pub description: Option<String>,
}

impl Item {
    pub fn is_tradeable(&self) -> bool {
        !self
            .flags
            .iter()
            .any(|f| f == "AccountBound" || f == "SoulbindOnAcquire" || f == "NoSell")
    }
}

// Commerce
#[derive(Deserialize, Clone, Debug)]
pub struct CommercePrice {
    pub id: u32,
    pub whitelisted: bool,
    pub buys: PriceSide,
    pub sells: PriceSide,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct PriceSide {
    pub quantity: u64,
    pub unit_price: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CommerceListings {
    pub id: u32,
    pub buys: Vec<Listing>,
    pub sells: Vec<Listing>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct Listing {
    pub listings: u32,
    pub unit_price: u64,
    pub quantity: u64,
}

impl CommerceListings {
    /// Total quantity offered across all sell listings.
    pub fn supply(&self) -> u64 {
        self.sells.iter().map(|l| l.quantity).sum()
    }

    /// Total quantity requested across all buy orders.
    pub fn demand(&self) -> u64 {
        self.buys.iter().map(|l| l.quantity).sum()
    }
}

// Account
#[derive(Deserialize, Clone, Debug)]
pub struct TokenInfo {
    pub id: String,
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Seconds played.
    pub age: u64,
    pub world: u32,
    pub created: String,
    #[serde(default)]
    pub commander: bool,
    pub fractal_level: Option<u32>,
    pub wvw_rank: Option<u32>,
    #[serde(default)]
    pub access: Vec<String>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct WalletEntry {
    pub id: u32,
    pub value: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Currency {
    pub id: u32,
    pub name: String,
    pub order: u32,
    pub icon: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AccountAchievement {
    pub id: u32,
    pub current: Option<u32>,
    pub max: Option<u32>,
    pub done: bool,
}

pub const COIN_CURRENCY_ID: u32 = 1;
