/// Localized editor-facing status messages for a language.
///
/// Load problems never leave the editor on a broken screen: the tree falls
/// back to empty content and `load_fallback_notice` explains why. Save
/// problems keep the tree populated and show `save_failed`.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    /// Shown when stored content could not be read and an empty form is offered
    pub load_fallback_notice: &'static str,

    /// Shown when the page could not be fetched; nothing is editable until a retry.
    /// Placeholders: {error}
    pub load_failed: &'static str,

    /// Shown when the page does not exist yet and will be created on save
    pub page_new_notice: &'static str,

    /// Shown when a save fails; the form is kept so the user can retry.
    /// Placeholders: {error}
    pub save_failed: &'static str,

    /// Shown after a successful save
    pub save_success: &'static str,

    /// Shown after the page is published
    pub publish_success: &'static str,

    /// Shown after the page is unpublished
    pub unpublish_success: &'static str,

    /// Shown next to a language tab whose content falls back to another language.
    /// Placeholders: {language}
    pub fallback_badge: &'static str,
}

impl LanguageStrings {
    pub fn french() -> Self {
        Self {
            load_fallback_notice:
                "Le contenu enregistré n'a pas pu être lu. Un formulaire vide a été chargé.",
            load_failed: "Le chargement de la page a échoué : {error}. Réessayez.",
            page_new_notice: "Cette page n'existe pas encore. Elle sera créée à l'enregistrement.",
            save_failed: "L'enregistrement a échoué : {error}. Vos modifications sont conservées, réessayez.",
            save_success: "Contenu enregistré.",
            publish_success: "Page publiée.",
            unpublish_success: "Page dépubliée.",
            fallback_badge: "Affiché en {language}",
        }
    }

    pub fn arabic() -> Self {
        Self {
            load_fallback_notice: "تعذرت قراءة المحتوى المحفوظ. تم تحميل نموذج فارغ.",
            load_failed: "فشل تحميل الصفحة: {error}. حاول مرة أخرى.",
            page_new_notice: "هذه الصفحة غير موجودة بعد. سيتم إنشاؤها عند الحفظ.",
            save_failed: "فشل الحفظ: {error}. تم الاحتفاظ بتعديلاتك، حاول مرة أخرى.",
            save_success: "تم حفظ المحتوى.",
            publish_success: "تم نشر الصفحة.",
            unpublish_success: "تم إلغاء نشر الصفحة.",
            fallback_badge: "معروض باللغة {language}",
        }
    }

    pub fn english() -> Self {
        Self {
            load_fallback_notice: "Stored content could not be read. An empty form was loaded.",
            load_failed: "Loading the page failed: {error}. Please retry.",
            page_new_notice: "This page does not exist yet. It will be created on save.",
            save_failed: "Save failed: {error}. Your changes are kept, please retry.",
            save_success: "Content saved.",
            publish_success: "Page published.",
            unpublish_success: "Page unpublished.",
            fallback_badge: "Shown in {language}",
        }
    }

    /// Fill the `{error}` placeholder of `load_failed`.
    pub fn format_load_failed(&self, error: &str) -> String {
        self.load_failed.replace("{error}", error)
    }

    /// Fill the `{error}` placeholder of `save_failed`.
    pub fn format_save_failed(&self, error: &str) -> String {
        self.save_failed.replace("{error}", error)
    }

    /// Fill the `{language}` placeholder of `fallback_badge`.
    pub fn format_fallback_badge(&self, language_name: &str) -> String {
        self.fallback_badge.replace("{language}", language_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_languages_have_error_placeholder() {
        for strings in [
            LanguageStrings::french(),
            LanguageStrings::arabic(),
            LanguageStrings::english(),
        ] {
            assert!(strings.load_failed.contains("{error}"));
            assert!(strings.save_failed.contains("{error}"));
            assert!(strings.fallback_badge.contains("{language}"));
        }
    }

    #[test]
    fn test_format_save_failed() {
        let message = LanguageStrings::english().format_save_failed("502 Bad Gateway");
        assert_eq!(
            message,
            "Save failed: 502 Bad Gateway. Your changes are kept, please retry."
        );
    }

    #[test]
    fn test_format_load_failed() {
        let message = LanguageStrings::english().format_load_failed("timed out");
        assert_eq!(message, "Loading the page failed: timed out. Please retry.");
    }

    #[test]
    fn test_format_fallback_badge() {
        let badge = LanguageStrings::french().format_fallback_badge("Français");
        assert_eq!(badge, "Affiché en Français");
    }

    #[test]
    fn test_no_empty_strings() {
        let strings = LanguageStrings::arabic();
        assert!(!strings.load_fallback_notice.is_empty());
        assert!(!strings.page_new_notice.is_empty());
        assert!(!strings.save_success.is_empty());
        assert!(!strings.publish_success.is_empty());
        assert!(!strings.unpublish_success.is_empty());
    }
}
