use serde::Serialize;

pub const DEFAULT_CHAT_MODEL: &str = "helia-sun-shield";
const TITLE_MODEL: &str = "title-model";
pub const BLOCK_MODEL: &str = "block-model";

/// A persona selectable in the chat model picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub static CHAT_MODELS: [ChatModel; 4] = [
    ChatModel {
        id: "helia-sun-shield",
        name: "Helia Sun Shield 🛡️",
        description: "Digital safety, cybersecurity, and online privacy expert",
    },
    ChatModel {
        id: "helia-growth-ray",
        name: "Helia Growth Ray 💡",
        description: "Emotional intelligence and personal development guide",
    },
    ChatModel {
        id: "helia-sunbeam",
        name: "Helia Sunbeam 🗣️",
        description: "Confidence, social skills, and relationship expert",
    },
    ChatModel {
        id: "helia-inner-dawn",
        name: "Helia Inner Dawn 🧘",
        description: "Mindfulness, meditation, and wellness guide",
    },
];

pub fn find_chat_model(id: &str) -> Option<&'static ChatModel> {
    CHAT_MODELS.iter().find(|model| model.id == id)
}

/// Provider model backing a language model id.
pub fn language_model(id: &str) -> Option<&'static str> {
    match id {
        "helia-sun-shield" | "helia-growth-ray" | "helia-sunbeam" | "helia-inner-dawn" => {
            Some("gpt-4o")
        }
        TITLE_MODEL => Some("gpt-4-turbo"),
        BLOCK_MODEL => Some("gpt-4o-mini"),
        _ => None,
    }
}
