//! Life events: the catalog of random shocks and windfalls, and the
//! per-turn draw.
//!
//! Each turn is an independent draw: no memory of earlier turns, no
//! protection against repeats.

use crate::{metrics::MetricsDelta, rng::RandomSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeEvent {
    pub title:       String,
    pub description: String,
    pub impact:      MetricsDelta,
}

impl LifeEvent {
    fn new(title: &str, description: &str, impact: MetricsDelta) -> Self {
        Self {
            title:       title.to_string(),
            description: description.to_string(),
            impact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    pub events: Vec<LifeEvent>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl EventCatalog {
    /// The built-in seven-entry catalog.
    pub fn standard() -> Self {
        let events = vec![
            LifeEvent::new(
                "Car Breakdown",
                "Your transmission failed.",
                MetricsDelta { cash: Some(-800.0), stress: Some(15), happiness: Some(-10), ..Default::default() },
            ),
            LifeEvent::new(
                "Medical Emergency",
                "Unexpected trip to the ER.",
                MetricsDelta { cash: Some(-500.0), stress: Some(20), happiness: Some(-5), ..Default::default() },
            ),
            LifeEvent::new(
                "Found $100",
                "Lucky day!",
                MetricsDelta { cash: Some(100.0), happiness: Some(5), ..Default::default() },
            ),
            LifeEvent::new(
                "Rent Increase",
                "Landlord raised the rent.",
                MetricsDelta { monthly_expenses: Some(200.0), stress: Some(10), ..Default::default() },
            ),
            LifeEvent::new(
                "Promotion!",
                "Hard work pays off.",
                MetricsDelta { monthly_income: Some(500.0), happiness: Some(20), stress: Some(-5), ..Default::default() },
            ),
            LifeEvent::new(
                "Identity Theft",
                "Someone opened a card in your name.",
                MetricsDelta { credit_score: Some(-50), stress: Some(30), ..Default::default() },
            ),
            LifeEvent::new(
                "Market Crash",
                "Your savings took a hit.",
                MetricsDelta { savings: Some(-200.0), stress: Some(10), ..Default::default() },
            ),
        ];
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&LifeEvent> {
        self.events.iter().find(|e| e.title == title)
    }

    /// Draw at most one event. With probability `1 - fire_probability`
    /// nothing happens; otherwise an entry is picked uniformly.
    pub fn draw(&self, fire_probability: f64, rng: &mut dyn RandomSource) -> Option<&LifeEvent> {
        if self.events.is_empty() || !rng.chance(fire_probability) {
            return None;
        }
        let index = rng.next_u64_below(self.events.len() as u64) as usize;
        self.events.get(index)
    }
}
