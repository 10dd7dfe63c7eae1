use std::collections::HashMap;

pub const GENERIC_PROMPT: &str = "[F] Interact";

/// What the presentation layer should do when the local participant interacts with a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneAction {
    OpenUrl(String),
    Alert(String),
    ConfirmLeave(String),
    ToggleZen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneBinding {
    pub prompt: String,
    pub action: Option<ZoneAction>,
}

fn office_bindings() -> [(&'static str, &'static str, ZoneAction); 6] {
    [
        (
            "meetingRoom",
            "[F] Start Meeting",
            ZoneAction::OpenUrl("https://meet.google.com/new".to_string()),
        ),
        (
            "genAI",
            "[F] Use AI Assistant",
            ZoneAction::Alert("AI Assistant feature coming soon!".to_string()),
        ),
        (
            "gaming",
            "[F] Play Mini-Game",
            ZoneAction::Alert("Gaming feature coming soon!".to_string()),
        ),
        (
            "exit",
            "[F] Exit Office",
            ZoneAction::ConfirmLeave("Are you sure you want to leave the office?".to_string()),
        ),
        (
            "coffeeCorner",
            "[F] Grab Coffee",
            ZoneAction::Alert(
                "\u{2615} You grabbed a fresh cup of coffee! Energy +100%".to_string(),
            ),
        ),
        ("zenZone", "[F] Meditate", ZoneAction::ToggleZen),
    ]
}

/// Zone name to prompt and action. Zones missing from the table get the generic prompt and
/// no action.
#[derive(Debug, Clone)]
pub struct ZoneTable {
    bindings: HashMap<String, ZoneBinding>,
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::office()
    }
}

impl ZoneTable {
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn office() -> Self {
        let mut table = Self::empty();
        for (zone, prompt, action) in office_bindings() {
            table.insert(zone, prompt, Some(action));
        }
        table
    }

    pub fn insert(
        &mut self,
        zone: impl Into<String>,
        prompt: impl Into<String>,
        action: Option<ZoneAction>,
    ) {
        self.bindings.insert(
            zone.into(),
            ZoneBinding {
                prompt: prompt.into(),
                action,
            },
        );
    }

    pub fn get(&self, zone: &str) -> Option<&ZoneBinding> {
        self.bindings.get(zone)
    }

    pub fn prompt(&self, zone: &str) -> &str {
        self.bindings
            .get(zone)
            .map_or(GENERIC_PROMPT, |binding| binding.prompt.as_str())
    }

    pub fn action(&self, zone: &str) -> Option<&ZoneAction> {
        self.bindings.get(zone).and_then(|b| b.action.as_ref())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
