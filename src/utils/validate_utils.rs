use serde::{Deserialize, Deserializer};
use surrealdb::sql::Thing;

// notification rows come back with record ids, the API exposes them as raw strings
pub fn deserialize_thing_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let thing = Thing::deserialize(deserializer)?;
    Ok(thing.to_raw())
}
