mod store;

pub use store::{
    NamedEntry, Storage, find_by_id_or_title, generate_id, is_today, is_today_instant,
    today_string,
};
