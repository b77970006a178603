//! Serde model of the reference-rate feed.
//!
//! ```xml
//! <gesmes:Envelope>
//!   <gesmes:subject>Reference rates</gesmes:subject>
//!   <Cube>
//!     <Cube time="2024-07-09">
//!       <Cube currency="USD" rate="1.0814"/>
//!     </Cube>
//!   </Cube>
//! </gesmes:Envelope>
//! ```
//!
//! Envelope metadata (`gesmes:*` elements, namespace attributes) has no
//! counterpart here and is skipped by the deserializer.

use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
pub struct RateCube {
    #[serde(rename = "@currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "@rate", default)]
    pub rate: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct DateCube {
    #[serde(rename = "@time", default)]
    pub time: Option<String>,
    #[serde(rename = "Cube", default)]
    pub rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct GroupCube {
    #[serde(rename = "Cube", default)]
    pub days: Vec<DateCube>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(rename = "Cube", default)]
    pub groups: Vec<GroupCube>,
}

impl Envelope {
    /// Date-groups in document order.
    pub fn days(&self) -> impl Iterator<Item = &DateCube> {
        self.groups.iter().flat_map(|group| group.days.iter())
    }
}
