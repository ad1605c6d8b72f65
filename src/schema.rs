//! Static registries describing what an EQL query may talk about.
//!
//! Everything here is fixed at compile time: the keyword vocabulary, the
//! chains a query can target, the selectable fields of each entity and the
//! filters (with their legal operators) each entity accepts. Declaration
//! order matters, since suggestion lists are never sorted.

// used to print out the surface text of keywords, entities and operators
use std::fmt;
// used to read entity names and operators back from query text
use std::str::FromStr;

use serde::{Serialize, Serializer};

pub const WILDCARD: &str = "*";

// ------------- Keywords -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Keyword {
    Get,
    From,
    Where,
    On,
    Dump,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::Get,
        Keyword::From,
        Keyword::Where,
        Keyword::On,
        Keyword::Dump,
    ];
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Get => "GET",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::On => "ON",
            Keyword::Dump => ">>",
        }
    }
    pub fn is_keyword(text: &str) -> bool {
        Keyword::ALL.iter().any(|k| k.as_str() == text)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Keyword {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Keyword::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(())
    }
}

impl Serialize for Keyword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ------------- Operators -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

pub const EQUALITY_OPERATORS: &[Operator] = &[Operator::Eq, Operator::NotEq];
pub const COMPARISON_OPERATORS: &[Operator] =
    &[Operator::Gt, Operator::GtEq, Operator::Lt, Operator::LtEq];
pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::NotEq,
    Operator::Gt,
    Operator::GtEq,
    Operator::Lt,
    Operator::LtEq,
];
const EQ_ONLY: &[Operator] = &[Operator::Eq];

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
        }
    }
    /// Characters an operator can be spelled with.
    pub fn is_operator_char(c: char) -> bool {
        matches!(c, '=' | '!' | '<' | '>')
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_OPERATORS
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or(())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ------------- Filters -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterDefinition {
    pub field: &'static str,
    pub operators: &'static [Operator],
}

const fn filter(field: &'static str, operators: &'static [Operator]) -> FilterDefinition {
    FilterDefinition { field, operators }
}

// ------------- Entities -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Account,
    Block,
    Tx,
    Log,
}

const ACCOUNT_FIELDS: &[&str] = &["nonce", "balance", "code", "chain"];
const BLOCK_FIELDS: &[&str] = &[
    "number",
    "hash",
    "parent_hash",
    "timestamp",
    "state_root",
    "transactions_root",
    "receipts_root",
    "logs_bloom",
    "extra_data",
    "mix_hash",
    "total_difficulty",
    "base_fee_per_gas",
    "withdrawals_root",
    "blob_gas_used",
    "excess_blob_gas",
    "parent_beacon_block_root",
    "size",
    "chain",
];
const TX_FIELDS: &[&str] = &[
    "type",
    "hash",
    "from",
    "to",
    "data",
    "value",
    "fee",
    "gas_price",
    "gas",
    "status",
    "chain_id",
    "v",
    "r",
    "s",
    "max_fee_per_blob_gas",
    "blob_versioned_hashes",
    "max_fee_per_gas",
    "max_priority_fee_per_gas",
    "access_list",
    "y_parity",
    "chain",
    "authorization_list",
    "nonce",
];
const LOG_FIELDS: &[&str] = &[
    "address",
    "topic0",
    "topic1",
    "topic2",
    "topic3",
    "data",
    "block_hash",
    "block_number",
    "block_timestamp",
    "transaction_hash",
    "transaction_index",
    "log_index",
    "removed",
    "chain",
];

const TX_FILTERS: &[FilterDefinition] = &[
    filter("block", EQ_ONLY),
    filter("from", EQUALITY_OPERATORS),
    filter("to", EQUALITY_OPERATORS),
    filter("data", EQUALITY_OPERATORS),
    filter("value", ALL_OPERATORS),
    filter("fee", ALL_OPERATORS),
    filter("gas", ALL_OPERATORS),
    filter("gas_price", ALL_OPERATORS),
    filter("chain", EQUALITY_OPERATORS),
    filter("max_fee_per_blob_gas", ALL_OPERATORS),
    filter("blob_versioned_hashes", EQUALITY_OPERATORS),
    filter("max_fee_per_gas", ALL_OPERATORS),
    filter("max_priority_fee_per_gas", ALL_OPERATORS),
    filter("access_list", EQUALITY_OPERATORS),
    filter("y_parity", EQUALITY_OPERATORS),
    filter("status", EQUALITY_OPERATORS),
    filter("type", EQUALITY_OPERATORS),
];
const LOG_FILTERS: &[FilterDefinition] = &[
    filter("block", EQ_ONLY),
    filter("event_signature", EQ_ONLY),
    filter("topic0", EQ_ONLY),
    filter("topic1", EQ_ONLY),
    filter("topic2", EQ_ONLY),
    filter("topic3", EQ_ONLY),
    filter("address", EQ_ONLY),
];

impl Entity {
    pub const ALL: [Entity; 4] = [Entity::Account, Entity::Block, Entity::Tx, Entity::Log];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Account => "account",
            Entity::Block => "block",
            Entity::Tx => "tx",
            Entity::Log => "log",
        }
    }
    /// Exact, case-sensitive lookup; the parser lower-cases before asking.
    pub fn from_name(name: &str) -> Option<Entity> {
        Entity::ALL.into_iter().find(|e| e.as_str() == name)
    }
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Entity::Account => ACCOUNT_FIELDS,
            Entity::Block => BLOCK_FIELDS,
            Entity::Tx => TX_FIELDS,
            Entity::Log => LOG_FIELDS,
        }
    }
    pub fn has_field(&self, field: &str) -> bool {
        self.fields().contains(&field)
    }
    pub fn filters(&self) -> &'static [FilterDefinition] {
        match self {
            Entity::Account | Entity::Block => &[],
            Entity::Tx => TX_FILTERS,
            Entity::Log => LOG_FILTERS,
        }
    }
    pub fn filter(&self, field: &str) -> Option<&'static FilterDefinition> {
        self.filters().iter().find(|f| f.field == field)
    }
    pub fn filter_fields(&self) -> impl Iterator<Item = &'static str> {
        self.filters().iter().map(|f| f.field)
    }
    /// Example identifiers offered right after `FROM <entity> `.
    pub fn identifier_hints(&self) -> &'static [&'static str] {
        match self {
            Entity::Account => &[".eth", "0x"],
            Entity::Block => &["1", "1:10", "latest", "pending", "finalized", "earliest"],
            Entity::Tx => &["WHERE", "0x"],
            Entity::Log => &["WHERE"],
        }
    }
    /// The handful of fields shown per entity before the entity is known.
    pub fn featured_fields(&self) -> &'static [&'static str] {
        match self {
            Entity::Account => &["nonce", "balance", "code", "chain"],
            Entity::Block => &["hash", "number", "timestamp", "size"],
            Entity::Tx => &[
                "hash", "nonce", "from", "to", "value", "gas", "gas_price", "data", "status",
            ],
            Entity::Log => &[
                "address",
                "topic0",
                "data",
                "block_number",
                "transaction_hash",
                "log_index",
            ],
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::from_name(s).ok_or(())
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Every field of every entity, in declaration order (duplicates kept).
pub fn all_entity_fields() -> impl Iterator<Item = &'static str> {
    Entity::ALL.into_iter().flat_map(|e| e.fields().iter().copied())
}

pub fn is_known_field(field: &str) -> bool {
    Entity::ALL.iter().any(|e| e.has_field(field))
}

// ------------- Chains -------------
pub const CHAINS: &[&str] = &[
    WILDCARD,
    "eth",
    "sepolia",
    "mekong",
    "arb",
    "op",
    "base",
    "blast",
    "polygon",
    "mantle",
    "zksync",
    "taiko",
    "celo",
    "avalanche",
];

pub fn chains_without_wildcard() -> impl Iterator<Item = &'static str> {
    CHAINS.iter().copied().filter(|c| *c != WILDCARD)
}

// ------------- Dump -------------
pub const DUMP_FORMATS: &[&str] = &[".json", ".csv", ".parquet"];
