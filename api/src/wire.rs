/// Raw wire types for the match detail endpoints: serde shapes for
/// deserializing `/match/{id}/…` responses. They map to the clean domain
/// types through the `From` impls below.
use crate::normalize::{coerce_score, text};
use crate::{Card, CardColor, Official, Scorer, Sides};
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Officials  (/match/{id}/officiels)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OfficialsResponse {
    #[serde(default)]
    pub data: Option<Vec<WireOfficial>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireOfficial {
    pub nom: Option<String>,
    pub fonction: Option<String>,
    pub code_fonction: Option<String>,
    /// Licence numbers come as strings or integers depending on the club.
    pub licence: Option<Value>,
}

impl From<WireOfficial> for Official {
    fn from(o: WireOfficial) -> Self {
        Official {
            name: o.nom.filter(|n| !n.is_empty()).unwrap_or_else(|| "Unknown".into()),
            role: o.fonction.filter(|f| !f.is_empty()).unwrap_or_else(|| "Unknown role".into()),
            code: o.code_fonction.unwrap_or_default(),
            licence: o.licence.as_ref().and_then(text).filter(|l| !l.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Scorers  (/match/{id}/buteurs)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ScorersResponse {
    #[serde(default)]
    pub data: Option<WireSides<Vec<WireScorer>>>,
}

/// `team1` is the home club, `team2` the visitors.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSides<T> {
    #[serde(default)]
    pub team1: Option<T>,
    #[serde(default)]
    pub team2: Option<T>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireScorer {
    pub numero_maillot: Option<Value>,
    pub buts: Option<Value>,
}

impl From<WireScorer> for Scorer {
    fn from(s: WireScorer) -> Self {
        Scorer {
            shirt_number: s.numero_maillot.as_ref().and_then(text).unwrap_or_else(|| "?".into()),
            goals: s.buts.as_ref().and_then(coerce_score).unwrap_or(0),
        }
    }
}

impl ScorersResponse {
    pub fn into_sides(self) -> Sides<Vec<Scorer>> {
        let sides = self.data.unwrap_or_default();
        let convert = |list: Option<Vec<WireScorer>>| {
            list.unwrap_or_default().into_iter().map(Scorer::from).collect()
        };
        Sides { home: convert(sides.team1), away: convert(sides.team2) }
    }
}

// ---------------------------------------------------------------------------
// Cards  (/match/{id}/cartons)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CardsResponse {
    #[serde(default)]
    pub data: Option<WireSides<WireCardSheet>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireCardSheet {
    #[serde(default)]
    pub vert: Option<Vec<WireCard>>,
    #[serde(default)]
    pub jaune: Option<Vec<WireCard>>,
    #[serde(default)]
    pub rouge: Option<Vec<WireCard>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireCard {
    pub nom: Option<String>,
}

impl WireCardSheet {
    /// Flatten into green, then yellow, then red cards.
    pub fn into_cards(self) -> Vec<Card> {
        let mut cards = Vec::new();
        for (color, list) in [
            (CardColor::Green, self.vert),
            (CardColor::Yellow, self.jaune),
            (CardColor::Red, self.rouge),
        ] {
            cards.extend(list.unwrap_or_default().into_iter().map(|c| Card {
                color,
                player: c.nom.unwrap_or_else(|| "Unknown".into()),
            }));
        }
        cards
    }
}

impl CardsResponse {
    pub fn into_sides(self) -> Sides<Vec<Card>> {
        let sides = self.data.unwrap_or_default();
        Sides {
            home: sides.team1.unwrap_or_default().into_cards(),
            away: sides.team2.unwrap_or_default().into_cards(),
        }
    }
}

// ---------------------------------------------------------------------------
// Match sheet  (/match/{id}/feuille-de-match)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SheetResponse {
    #[serde(default)]
    pub html: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cards_flatten_in_sheet_color_order() {
        let raw = r#"{"data":{"team1":{"rouge":[{"nom":"R"}],"vert":[{"nom":"G1"},{"nom":"G2"}]},"team2":{}}}"#;
        let parsed: CardsResponse = serde_json::from_str(raw).unwrap();
        let sides = parsed.into_sides();
        let colors: Vec<CardColor> = sides.home.iter().map(|c| c.color).collect();
        assert_eq!(colors, vec![CardColor::Green, CardColor::Green, CardColor::Red]);
        assert!(sides.away.is_empty());
    }

    #[test]
    fn scorers_accept_numeric_and_string_fields() {
        let raw = r#"{"data":{"team1":[{"numero_maillot":7,"buts":"2"}],"team2":[{"numero_maillot":"10","buts":1}]}}"#;
        let sides = serde_json::from_str::<ScorersResponse>(raw).unwrap().into_sides();
        assert_eq!(sides.home, vec![Scorer { shirt_number: "7".into(), goals: 2 }]);
        assert_eq!(sides.away, vec![Scorer { shirt_number: "10".into(), goals: 1 }]);
    }

    #[test]
    fn missing_data_is_empty() {
        let sides = serde_json::from_str::<ScorersResponse>("{}").unwrap().into_sides();
        assert!(sides.home.is_empty() && sides.away.is_empty());
        let officials = serde_json::from_str::<OfficialsResponse>(r#"{"data":null}"#).unwrap();
        assert!(officials.data.is_none());
    }

    #[test]
    fn officials_fall_back_to_placeholders() {
        let o: Official = WireOfficial {
            nom: None,
            fonction: Some(String::new()),
            code_fonction: Some("ARB".into()),
            licence: Some(Value::from(123456)),
        }
        .into();
        assert_eq!(o.name, "Unknown");
        assert_eq!(o.role, "Unknown role");
        assert_eq!(o.licence.as_deref(), Some("123456"));
    }
}
