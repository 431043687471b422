use serde_json::Value;

const MAX_INVASION_LINES: usize = 8;

/// Rewards worth surfacing from the invasion list.
const INTERESTING_REWARDS: [&str; 10] = [
    "catalyst",
    "reactor",
    "forma",
    "vandal",
    "wraith",
    "mutagen mass",
    "fieldron",
    "detonite",
    "exilus",
    "adapter",
];

/// Renders the activities text block (sortie, archon hunt, void trader,
/// invasions, fissures) from a raw world-state snapshot. Missing sections
/// are skipped; nothing here fails.
pub fn render_activities(raw: &Value) -> String {
    let mut sections = Vec::new();

    if let Some(sortie) = render_mission_set(raw.get("sortie"), "Sortie", true) {
        sections.push(sortie);
    }
    if let Some(archon) = render_mission_set(raw.get("archonHunt"), "Archon Hunt", false) {
        sections.push(archon);
    }

    sections.push(format!(
        "Void Trader:\n{}",
        render_void_trader(raw.get("voidTrader"))
    ));

    let invasions = interesting_invasions(raw.get("invasions"));
    if !invasions.is_empty() {
        let mut block = String::from("Interesting Invasions:");
        for reward in invasions.iter().take(MAX_INVASION_LINES) {
            block.push_str(&format!("\n- {reward}"));
        }
        sections.push(block);
    }

    if let Some(fissures) = raw.get("fissures").and_then(Value::as_array) {
        if !fissures.is_empty() {
            sections.push(format!("Active Fissures: {}", fissures.len()));
        }
    }

    sections.join("\n\n")
}

/// Sortie and archon hunt share the same shape: a boss plus numbered
/// mission variants. Sorties additionally carry a faction and per-mission
/// modifiers.
fn render_mission_set(section: Option<&Value>, heading: &str, with_modifiers: bool) -> Option<String> {
    let section = section?;
    let variants = section.get("variants").and_then(Value::as_array)?;
    if variants.is_empty() {
        return None;
    }

    let boss = section.get("boss").and_then(Value::as_str).unwrap_or("Unknown");
    let mut block = if with_modifiers {
        let faction = section
            .get("faction")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        format!("{heading} ({boss} - {faction}):")
    } else {
        format!("{heading} ({boss}):")
    };

    for (index, mission) in variants.iter().enumerate() {
        let mission_type = mission
            .get("missionType")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        if with_modifiers {
            let modifier = mission
                .get("modifier")
                .and_then(Value::as_str)
                .unwrap_or("None");
            block.push_str(&format!("\n{}. {} - {}", index + 1, mission_type, modifier));
        } else {
            block.push_str(&format!("\n{}. {}", index + 1, mission_type));
        }
    }

    Some(block)
}

pub fn render_void_trader(trader: Option<&Value>) -> String {
    let Some(trader) = trader else {
        return "Unknown".to_string();
    };

    let location = trader
        .get("location")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");

    if trader.get("active").and_then(Value::as_bool).unwrap_or(false) {
        let mut block = format!("Baro is at {location}!\nInventory:");
        let inventory = trader
            .get("inventory")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for item in inventory {
            let name = item.get("item").and_then(Value::as_str).unwrap_or("Unknown");
            let ducats = item
                .get("ducats")
                .and_then(Value::as_i64)
                .map(|d| d.to_string())
                .unwrap_or_else(|| "?".to_string());
            let credits = item
                .get("credits")
                .and_then(Value::as_i64)
                .map(|c| c.to_string())
                .unwrap_or_else(|| "?".to_string());
            block.push_str(&format!("\n- {name} ({ducats}d + {credits}cr)"));
        }
        block
    } else {
        let arrival = trader
            .get("startString")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        format!("Baro arrives in {arrival} at {location}")
    }
}

/// Filters the invasion list down to uncompleted ones whose attacker or
/// defender reward matches the keyword list, one line per reward with the
/// node attached.
pub fn interesting_invasions(invasions: Option<&Value>) -> Vec<String> {
    let Some(invasions) = invasions.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut interesting = Vec::new();
    for invasion in invasions {
        if invasion
            .get("completed")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            continue;
        }

        let node = invasion
            .get("node")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");

        for side in ["attackerReward", "defenderReward"] {
            let reward = invasion
                .get(side)
                .and_then(|r| r.get("asString"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let lowered = reward.to_lowercase();
            if INTERESTING_REWARDS
                .iter()
                .any(|keyword| lowered.contains(keyword))
            {
                interesting.push(format!("{reward} ({node})"));
            }
        }
    }
    interesting
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_invasions_to_interesting_rewards() {
        let invasions = json!([
            {
                "completed": false,
                "node": "Ose (Europa)",
                "attackerReward": { "asString": "Orokin Catalyst Blueprint" },
                "defenderReward": { "asString": "300x Alloy Plate" }
            },
            {
                "completed": true,
                "node": "Naamah (Europa)",
                "attackerReward": { "asString": "Forma Blueprint" }
            },
            {
                "completed": false,
                "node": "Cytherean (Venus)",
                "attackerReward": { "asString": "150x Nano Spores" },
                "defenderReward": { "asString": "Dera Vandal Stock" }
            }
        ]);

        let interesting = interesting_invasions(Some(&invasions));
        assert_eq!(
            interesting,
            vec![
                "Orokin Catalyst Blueprint (Ose (Europa))",
                "Dera Vandal Stock (Cytherean (Venus))"
            ]
        );
    }

    #[test]
    fn active_void_trader_lists_inventory() {
        let trader = json!({
            "active": true,
            "location": "Kronia Relay (Saturn)",
            "inventory": [
                { "item": "Primed Flow", "ducats": 350, "credits": 110000 }
            ]
        });

        let rendered = render_void_trader(Some(&trader));
        assert_eq!(
            rendered,
            "Baro is at Kronia Relay (Saturn)!\nInventory:\n- Primed Flow (350d + 110000cr)"
        );
    }

    #[test]
    fn inactive_void_trader_shows_arrival() {
        let trader = json!({
            "active": false,
            "location": "Strata Relay (Earth)",
            "startString": "3d 4h 12m"
        });

        assert_eq!(
            render_void_trader(Some(&trader)),
            "Baro arrives in 3d 4h 12m at Strata Relay (Earth)"
        );
    }

    #[test]
    fn renders_sortie_with_modifiers_and_archon_without() {
        let raw = json!({
            "sortie": {
                "boss": "Kela De Thaym",
                "faction": "Grineer",
                "variants": [
                    { "missionType": "Assault", "modifier": "Augmented Armor" },
                    { "missionType": "Defense" }
                ]
            },
            "archonHunt": {
                "boss": "Archon Amar",
                "variants": [
                    { "missionType": "Exterminate" }
                ]
            }
        });

        let rendered = render_activities(&raw);
        assert!(rendered.contains(
            "Sortie (Kela De Thaym - Grineer):\n1. Assault - Augmented Armor\n2. Defense - None"
        ));
        assert!(rendered.contains("Archon Hunt (Archon Amar):\n1. Exterminate"));
    }

    #[test]
    fn empty_snapshot_still_renders_void_trader_section() {
        let rendered = render_activities(&json!({}));
        assert_eq!(rendered, "Void Trader:\nUnknown");
    }

    #[test]
    fn fissure_count_appears_when_present() {
        let raw = json!({ "fissures": [{}, {}, {}] });
        assert!(render_activities(&raw).contains("Active Fissures: 3"));
    }
}
