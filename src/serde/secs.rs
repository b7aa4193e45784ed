use serde::Deserialize;
use serde::de::Deserializer;
use serde::ser::Serializer;
use time::Timespec;

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timespec, D::Error>
    where D: Deserializer<'de>
{
    let sec = i64::deserialize(deserializer)?;
    Ok(Timespec::new(sec, 0))
}

pub fn serialize<S: Serializer>(ts: &Timespec, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(ts.sec)
}
