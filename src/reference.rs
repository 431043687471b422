use serde::Serialize;

/// Faction health type, what it takes extra damage from, what it resists.
const DAMAGE_TABLE: [(&str, &str, &str); 6] = [
    ("Grineer (Ferrite)", "Corrosive", "Blast"),
    ("Grineer (Alloy)", "Radiation", "Electric, Magnetic"),
    ("Corpus (Shields)", "Magnetic, Cold", "Radiation"),
    ("Corpus (Proto)", "Magnetic, Toxin", "Corrosive"),
    ("Infested (Light)", "Gas, Heat", "Radiation, Viral"),
    ("Infested (Fossil)", "Corrosive, Blast", "Cold"),
];

const STATUS_EFFECTS: [(&str, &str); 13] = [
    ("Slash", "Health Dmg over time (Bypasses Armor)"),
    ("Impact", "Stagger / Mercy Kill threshold"),
    ("Puncture", "Reduces Enemy Damage"),
    ("Heat", "DoT + Strips 50% Armor"),
    ("Cold", "Slows Enemy + Crit Dmg Bonus"),
    ("Electric", "Chain Lightning DoT"),
    ("Toxin", "Health DoT (Bypasses Shield)"),
    ("Blast", "AoE Dmg + Reduces Accuracy"),
    ("Corrosive", "Strips Armor"),
    ("Gas", "AoE Gas Clouds"),
    ("Magnetic", "Increased Shield Dmg + Disables Regen"),
    ("Radiation", "Confusion (Friendly Fire)"),
    ("Viral", "Increases Damage to Health"),
];

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePayload {
    pub text: String,
}

/// Static damage-type and status-effect cheat sheet for the reference tab.
#[tauri::command]
pub fn get_reference_text() -> ReferencePayload {
    ReferencePayload {
        text: render_reference(),
    }
}

pub fn render_reference() -> String {
    let mut block = String::from("Damage Types:");
    for (faction, weakness, resistance) in DAMAGE_TABLE {
        block.push_str(&format!("\n- {faction}: ++ {weakness} / -- {resistance}"));
    }

    block.push_str("\n\nStatus Effects:");
    for (status, effect) in STATUS_EFFECTS {
        block.push_str(&format!("\n- {status}: {effect}"));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_faction_and_status() {
        let text = render_reference();

        assert_eq!(text.matches("++").count(), DAMAGE_TABLE.len());
        for (status, _) in STATUS_EFFECTS {
            assert!(text.contains(&format!("\n- {status}: ")), "missing {status}");
        }
    }

    #[test]
    fn renders_weakness_and_resistance_per_faction() {
        let text = render_reference();

        assert!(text.contains("- Grineer (Ferrite): ++ Corrosive / -- Blast"));
        assert!(text.contains("- Corpus (Shields): ++ Magnetic, Cold / -- Radiation"));
    }

    #[test]
    fn sections_are_ordered_damage_then_status() {
        let text = render_reference();

        let damage = text.find("Damage Types:").unwrap();
        let status = text.find("Status Effects:").unwrap();
        assert!(damage < status);
    }
}
