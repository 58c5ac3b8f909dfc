//! Localized strings appended to or embedded in translated documents.

/// Localized strings for one output language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStrings {
    /// Notice appended to every machine-translated document, separated from
    /// the body by one blank line
    pub translated_notice: &'static str,
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    translated_notice: "> This post is translated using ChatGPT, please [**feedback**](https://github.com/linyuxuanlin/Wiki_MkDocs/issues/new) if any omissions.",
};

// ==================== Spanish Strings ====================

pub const SPANISH_STRINGS: LanguageStrings = LanguageStrings {
    translated_notice: "> Este post está traducido usando ChatGPT, por favor [**feedback**](https://github.com/linyuxuanlin/Wiki_MkDocs/issues/new) si hay alguna omisión.",
};

// ==================== Arabic Strings ====================

pub const ARABIC_STRINGS: LanguageStrings = LanguageStrings {
    translated_notice: "> تمت ترجمة هذه المشاركة باستخدام ChatGPT، يرجى [**تزويدنا بتعليقاتكم**](https://github.com/linyuxuanlin/Wiki_MkDocs/issues/new) إذا كانت هناك أي حذف أو إهمال.",
};
