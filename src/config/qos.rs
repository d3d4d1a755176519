use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::NotifierError;

/// MQTT delivery guarantee.
///
/// Deserialises from the numeric level so that an out-of-range value is
/// rejected while configuration is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Qos {
    #[default]
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

impl Qos {
    pub const ALL: [Qos; 3] = [Qos::AtMostOnce, Qos::AtLeastOnce, Qos::ExactlyOnce];

    pub fn level(self) -> u8 {
        match self {
            Qos::AtMostOnce => 0,
            Qos::AtLeastOnce => 1,
            Qos::ExactlyOnce => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Qos::AtMostOnce => "AT_MOST_ONCE",
            Qos::AtLeastOnce => "AT_LEAST_ONCE",
            Qos::ExactlyOnce => "EXACTLY_ONCE",
        }
    }

    /// `(name, level)` pairs for populating a selection list.
    pub fn choices() -> impl Iterator<Item = (&'static str, u8)> {
        Self::ALL.into_iter().map(|qos| (qos.name(), qos.level()))
    }
}

impl TryFrom<u8> for Qos {
    type Error = NotifierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Qos::AtMostOnce),
            1 => Ok(Qos::AtLeastOnce),
            2 => Ok(Qos::ExactlyOnce),
            other => Err(NotifierError::InvalidQos(other)),
        }
    }
}

impl From<Qos> for u8 {
    fn from(qos: Qos) -> Self {
        qos.level()
    }
}

impl From<Qos> for rumqttc::QoS {
    fn from(qos: Qos) -> Self {
        match qos {
            Qos::AtMostOnce => rumqttc::QoS::AtMostOnce,
            Qos::AtLeastOnce => rumqttc::QoS::AtLeastOnce,
            Qos::ExactlyOnce => rumqttc::QoS::ExactlyOnce,
        }
    }
}

impl fmt::Display for Qos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_levels() {
        assert_eq!(Qos::try_from(0).unwrap(), Qos::AtMostOnce);
        assert_eq!(Qos::try_from(1).unwrap(), Qos::AtLeastOnce);
        assert_eq!(Qos::try_from(2).unwrap(), Qos::ExactlyOnce);
        assert!(matches!(Qos::try_from(3), Err(NotifierError::InvalidQos(3))));
    }

    #[test]
    fn test_choices_cover_all_levels() {
        let choices: Vec<_> = Qos::choices().collect();
        assert_eq!(
            choices,
            vec![("AT_MOST_ONCE", 0), ("AT_LEAST_ONCE", 1), ("EXACTLY_ONCE", 2)]
        );
    }

    #[test]
    fn test_deserialize_rejects_out_of_range() {
        let qos: Qos = serde_json::from_str("2").unwrap();
        assert_eq!(qos, Qos::ExactlyOnce);
        assert!(serde_json::from_str::<Qos>("7").is_err());
    }
}
