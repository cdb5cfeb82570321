//! Static vocabulary served when the store is unconfigured or unreachable.
//!
//! Only vocabulary gets a non-empty fallback; lessons, dialogues and grammar
//! degrade to empty lists. Client code depends on this list being non-empty,
//! so the asymmetry is deliberate.

use crate::db::operations::vocabulary::VocabularyEntry;

pub fn fallback_vocabulary() -> Vec<VocabularyEntry> {
    FALLBACK_WORDS
        .iter()
        .map(|&(id, chinese, pinyin, english)| VocabularyEntry {
            id,
            chinese: chinese.to_string(),
            pinyin: pinyin.to_string(),
            english: english.to_string(),
            difficulty: "beginner".to_string(),
            hsk_level: 1,
        })
        .collect()
}

const FALLBACK_WORDS: [(i32, &str, &str, &str); 8] = [
    (1, "你好", "nǐ hǎo", "hello"),
    (2, "谢谢", "xièxie", "thank you"),
    (3, "再见", "zàijiàn", "goodbye"),
    (4, "学习", "xuéxí", "to study"),
    (5, "中文", "zhōngwén", "Chinese language"),
    (6, "朋友", "péngyou", "friend"),
    (7, "吃饭", "chīfàn", "to eat"),
    (8, "喝水", "hēshuǐ", "to drink water"),
];
