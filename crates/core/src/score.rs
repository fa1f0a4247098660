//! Qualitative result messages keyed by score bucket.

/// Title/subtitle pair shown on the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultText {
    pub title: &'static str,
    pub subtitle: String,
}

/// Map a final score to its result message.
///
/// The wording follows the five-question bucket table: for `total == 5` the
/// bucket is the exact correct count. Other batch sizes are scaled onto the
/// same five buckets via `correct * 5 / total`, so a full score always lands
/// in the top bucket and zero in the fallback one.
#[must_use]
pub fn result_message(correct: u32, total: u32) -> ResultText {
    let bucket = if total == 0 {
        0
    } else {
        u64::from(correct.min(total)) * 5 / u64::from(total)
    };

    let (title, tail) = match bucket {
        5 => (
            "Идеально!",
            "вы ответили на всё правильно. Это блестящий результат!",
        ),
        4 => (
            "Почти идеально!",
            "очень близко к совершенству. Ещё один шаг!",
        ),
        3 => (
            "Хороший результат!",
            "вы на верном пути. Продолжайте тренироваться!",
        ),
        2 => (
            "Есть над чем поработать",
            "не расстраивайтесь, попробуйте ещё раз!",
        ),
        1 => (
            "Сложный вопрос?",
            "иногда просто не ваш день. Следующая попытка будет лучше!",
        ),
        _ => (
            "Бывает и так!",
            "не отчаивайтесь. Начните заново и удивите себя!",
        ),
    };

    ResultText {
        title,
        subtitle: format!("{correct}/{total} — {tail}"),
    }
}
