//! Intents the webhook fulfills, keyed by Dialogflow display name.

/// A recognized intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Greeting or "back to main menu": reset and show level chips.
    Welcome,
    /// A level chip was picked.
    SelectLevel,
    /// A subject chip was picked.
    SelectSubject,
    /// A lesson chip was picked.
    SelectLesson,
    /// A subbab chip was picked; explain it.
    SelectSubbab,
    /// The student wants to type a question.
    AskAgain,
    /// A typed question (explicit or caught by the fallback intent).
    CustomQuestion,
}

const ROUTES: &[(&str, Intent)] = &[
    ("Default Welcome Intent", Intent::Welcome),
    ("Menu Utama", Intent::Welcome),
    ("Pilih Jenjang", Intent::SelectLevel),
    ("Pilih Pelajaran", Intent::SelectSubject),
    ("Pilih Materi", Intent::SelectLesson),
    ("Pilih Subbab", Intent::SelectSubbab),
    ("Tanya Lagi ke AI", Intent::AskAgain),
    ("Custom Pertanyaan", Intent::CustomQuestion),
    ("Default Fallback Intent", Intent::CustomQuestion),
];

impl Intent {
    /// Exact-match lookup; display names are case sensitive.
    pub fn from_display_name(name: &str) -> Option<Self> {
        ROUTES
            .iter()
            .find(|(display, _)| *display == name)
            .map(|(_, intent)| *intent)
    }
}
