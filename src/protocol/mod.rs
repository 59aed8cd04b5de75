//! Protocol Module
//!
//! The memcache text protocol as seen by an administrative client.
//!
//! ## Requests
//! ASCII lines terminated by CRLF. `set` is followed by exactly `<bytes>`
//! payload bytes and another CRLF.
//!
//! ## Replies
//! | Command | Reply |
//! |---|---|
//! | `stats [settings]` | `STAT <name> <value>`* then `END` |
//! | `stats slabs` | `STAT <id>:<field> <value>`* and `STAT <field> <value>`*, then `END` |
//! | `stats cachedump <id> <limit>` | `ITEM <key> [<bytes> b; <exptime> s]`* then `END` |
//! | `get <key>` | `VALUE <key> <flags> <bytes>` + data block, then `END` |
//! | `set`/`delete`/`incr`/`decr`/`flush_all` | a single status line |

mod command;
mod codec;
mod grammar;
mod reply;
mod types;

pub use command::{validate_key, Command, StatsKind, MAX_KEY_LENGTH};
pub use codec::{encode_command, CRLF};
pub use grammar::{Grammar, Scan};
pub use reply::{
    merge_items, parse_cachedump, parse_get, parse_item_line, parse_passthrough, parse_slabs,
    parse_stats, parse_status,
};
pub use types::{
    Expiration, ItemDescriptor, ItemDetail, RawValue, SearchHit, ServerEndpoint, SlabStats,
    SlabSummary, StatLine, Stats, StatusReply,
};
