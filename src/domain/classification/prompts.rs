//! Prompt templates for the three classification kinds.

use once_cell::sync::Lazy;

use crate::domain::conversation::ConversationWindow;
use crate::domain::labels::{ClassificationKind, Topic};

const SYSTEM_PROMPT: &str = "Düğün sektörüne gelen Türkçe müşteri mesajlarını sınıflandıran bir asistansın. \
Yalnızca istenen kategorilerden birini seç ve tek satırlık, açıklamasız bir cevap ver. \
Emin olmadığında en yakın kategoriyi seç.";

static TOPIC_LIST: Lazy<String> = Lazy::new(|| {
    Topic::all()
        .iter()
        .map(|t| t.display_name())
        .collect::<Vec<_>>()
        .join(", ")
});

/// Shared system prompt.
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// User prompt for one kind. The answered kind also gets the rendered window.
pub fn user_prompt(kind: ClassificationKind, window: &ConversationWindow<'_>) -> String {
    let text = window.target().text;
    match kind {
        ClassificationKind::Sentiment => format!(
            "Mesajın duygu tonunu belirle.\n\nMESAJ: \"{text}\"\n\n\
             Seçenekler: Pozitif, Negatif, Nötr.\n\
             Teşekkür ve övgü Pozitif, şikayet ve kızgınlık Negatif, soru ve bilgi talebi Nötr sayılır.\n\n\
             CEVAP (tek kelime):"
        ),
        ClassificationKind::Topic => format!(
            "Mesajın ana konusunu belirle.\n\nMESAJ: \"{text}\"\n\n\
             KATEGORİLER: {categories}\n\
             Fiyat soruları için \"Fiyat Sorgusu\", şikayetler için \"Şikayet\" kullan.\n\n\
             CEVAP (yalnızca kategori adı):",
            categories = TOPIC_LIST.as_str()
        ),
        ClassificationKind::Answered => format!(
            "Müşterinin mesajı destek ekibi tarafından yanıtlanmış mı?\n\n\
             KONUŞMA:\n{context}\n\n\
             MÜŞTERİ MESAJI: \"{text}\"\n\n\
             Müşteri mesajından sonra gelen destek yanıtları (otomatik olanlar dahil) Evet sayılır.\n\n\
             CEVAP (Evet/Hayır):",
            context = window.render()
        ),
    }
}
