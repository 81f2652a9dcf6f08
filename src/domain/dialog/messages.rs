//! User-facing copy. Students see these strings verbatim.

use crate::domain::curriculum::SchoolLevel;

pub const WELCOME: &str = "👋 Halo! Selamat datang di LearnAble! 📚 Yuk mulai petualangan \
                           belajarmu bersama kami. Silakan pilih jenjang pendidikan di bawah ini:";
pub const LEVEL_REPROMPT: &str = "👋 Silakan pilih ulang jenjang pendidikan terlebih dahulu:";

pub const ANSWER_HEADER: &str = "🤖 Gemini Bot:\n";
pub const ANSWER_FOLLOW_UP: &str = "🤖 Chatbot:\nIngin bertanya lagi atau kembali ke menu?:";
pub const CHIP_ASK_AGAIN: &str = "💬 Tanya Lagi ke AI";
pub const CHIP_MAIN_MENU: &str = "🏠 Menu Utama";

pub const PROCESSING: &str = "🤖 Jawaban sedang diproses… Mohon tunggu sebentar.";
pub const ASK_PROMPT: &str = "💬 Silakan ketik pertanyaan yang ingin kamu tanyakan ke AI 😊";
pub const EMPTY_QUESTION: &str = "❗ Pertanyaan tidak boleh kosong.";
pub const NOT_RECOGNIZED: &str = "Maaf, intent tidak dikenali.";
pub const GENERIC_ERROR: &str = "❌ Maaf, terjadi kesalahan. Silakan coba lagi.";
pub const SUBBAB_NOT_FOUND: &str = "Subbab tidak ditemukan.";
pub const BUSY: &str = "⏰ Maaf, server sedang sibuk. Silakan coba lagi dalam beberapa saat.";

pub const AI_NOT_CONFIGURED: &str = "❌ Konfigurasi Gemini API tidak valid.";
pub const AI_NETWORK: &str = "🌐 Maaf, terjadi masalah koneksi. Silakan coba lagi.";
pub const AI_PARSE: &str = "📄 Maaf, terjadi kesalahan dalam memproses jawaban.";

/// Prefixes that mark a generated answer as an apology rather than content.
pub const FAILURE_MARKERS: [&str; 5] = ["❌", "⏰", "🌐", "📄", "❗"];

/// True when the text is one of our own apologies and must not be cached.
pub fn is_failure_marker(text: &str) -> bool {
    let text = text.trim_start();
    text.is_empty() || FAILURE_MARKERS.iter().any(|m| text.starts_with(m))
}

pub fn subjects_heading(level: SchoolLevel) -> String {
    format!("Berikut pelajaran untuk jenjang {} yang tersedia:", level.label())
}

pub fn lessons_heading(level: SchoolLevel, subject: &str) -> String {
    format!("Materi untuk {} jenjang {}:", subject, level.label())
}

pub fn subbabs_heading(lesson: &str) -> String {
    format!("Berikut sub-bab dari {}:", lesson)
}

pub fn no_subjects(level: SchoolLevel) -> String {
    format!("❗ Belum ada pelajaran untuk jenjang {}.", level.label())
}

pub fn subject_not_found(subject: &str, level: SchoolLevel) -> String {
    format!(
        "❗ Pelajaran '{}' tidak ditemukan untuk jenjang {}.",
        subject,
        level.label()
    )
}

pub fn no_lessons(subject: &str, level: SchoolLevel) -> String {
    format!("❗ Belum ada materi untuk {} jenjang {}.", subject, level.label())
}

pub fn lesson_not_found(lesson: &str, subject: &str) -> String {
    format!(
        "❗ Materi '{}' tidak ditemukan untuk pelajaran {}.",
        lesson, subject
    )
}

pub fn no_subbabs(lesson: &str) -> String {
    format!("❗ Belum ada sub-bab untuk materi {}.", lesson)
}

pub fn subbab_not_found(title: &str) -> String {
    format!("❗ Subbab '{}' tidak ditemukan.", title)
}

/// Notice shown above the previous menu when a store lookup failed.
pub fn lookup_failed(what: &str) -> String {
    format!("❗ Terjadi kesalahan saat mengambil {}.", what)
}

/// Prompt asking for a simple explanation of a subbab, grounded on its content.
pub fn theory_prompt(level: SchoolLevel, title: &str, content: &str) -> String {
    let mut prompt = format!(
        "Jelaskan dengan sederhana kepada siswa disablitas tunarungu {} tentang '{}'. \
         Berikan penjelasan yang mudah dipahami dan berikan 1 contoh soal sederhana juga.",
        level.label(),
        title
    );
    let content = content.trim();
    if !content.is_empty() {
        prompt.push_str("\n\nGunakan materi berikut sebagai acuan:\n");
        prompt.push_str(content);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_every_failure_marker() {
        for marker in FAILURE_MARKERS {
            assert!(is_failure_marker(&format!("{} gagal", marker)));
        }
        assert!(is_failure_marker(BUSY));
        assert!(is_failure_marker(EMPTY_QUESTION));
        assert!(is_failure_marker("   "));
    }

    #[test]
    fn regular_answers_are_not_markers() {
        assert!(!is_failure_marker("Pecahan adalah bagian dari keseluruhan."));
        assert!(!is_failure_marker("Contoh: 1 ❌ 2"));
    }

    #[test]
    fn theory_prompt_appends_content_when_present() {
        let bare = theory_prompt(SchoolLevel::Sd, "Pecahan", "  ");
        assert!(bare.starts_with(
            "Jelaskan dengan sederhana kepada siswa disablitas tunarungu SD tentang 'Pecahan'."
        ));
        assert!(!bare.contains("acuan"));

        let grounded = theory_prompt(
            SchoolLevel::Sd,
            "Pecahan",
            "Pecahan terdiri dari pembilang dan penyebut.",
        );
        assert!(grounded.ends_with("Pecahan terdiri dari pembilang dan penyebut."));
    }

    #[test]
    fn headings_use_upper_case_level() {
        assert_eq!(
            lessons_heading(SchoolLevel::Sd, "Matematika"),
            "Materi untuk Matematika jenjang SD:"
        );
        assert_eq!(
            subjects_heading(SchoolLevel::Sma),
            "Berikut pelajaran untuk jenjang SMA yang tersedia:"
        );
    }
}
