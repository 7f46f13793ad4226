use crate::file::{FileKind, FileRecord};
use crate::settings::Settings;

/// Whether `file` may appear in the list at all.
pub fn is_eligible(file: &FileRecord, settings: &Settings) -> bool {
    if is_excluded(file, settings) {
        return false;
    }
    shown_kind(file, settings).is_some()
}

/// The first category of `file` whose toggle is on.
pub fn shown_kind(file: &FileRecord, settings: &Settings) -> Option<FileKind> {
    FileKind::kinds_of(&file.extension).find(|k| settings.shows(*k))
}

fn is_excluded(file: &FileRecord, settings: &Settings) -> bool {
    let path = file.path.to_lowercase();
    let in_folder = settings.excluded_folders.iter().any(|folder| {
        let prefix = folder.trim_matches('/').to_lowercase();
        !prefix.is_empty()
            && path
                .strip_prefix(&prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    });
    if in_folder {
        return true;
    }
    if settings
        .excluded_files
        .iter()
        .any(|f| f.to_lowercase() == path)
    {
        return true;
    }
    if settings.excluded_tags.is_empty() || file.tags.is_empty() {
        return false;
    }
    file.tags.iter().any(|tag| {
        let tag = tag.trim_start_matches('#').to_lowercase();
        settings
            .excluded_tags
            .iter()
            .any(|ex| ex.trim_start_matches('#').to_lowercase() == tag)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileRecord {
        FileRecord::new(path, 10, 0)
    }

    #[test]
    fn excluded_folder_needs_separator() {
        let mut s = Settings::default();
        s.excluded_folders = vec!["Archive".into()];
        assert!(!is_eligible(&file("archive/old.md"), &s));
        assert!(!is_eligible(&file("Archive/2020/deep.md"), &s));
        assert!(is_eligible(&file("Archived.md"), &s));
        assert!(is_eligible(&file("ArchiveNotes/x.md"), &s));
    }

    #[test]
    fn excluded_file_is_exact_and_case_insensitive() {
        let mut s = Settings::default();
        s.excluded_files = vec!["Inbox/Todo.md".into()];
        assert!(!is_eligible(&file("inbox/todo.md"), &s));
        assert!(is_eligible(&file("inbox/todo.md.bak.md"), &s));
    }

    #[test]
    fn excluded_tags_match_without_hash() {
        let mut s = Settings::default();
        s.excluded_tags = vec!["Draft".into()];
        let tagged = file("a.md").with_tags(["#draft"]);
        let other = file("b.md").with_tags(["final"]);
        assert!(!is_eligible(&tagged, &s));
        assert!(is_eligible(&other, &s));
    }

    #[test]
    fn excluded_tags_fold_non_ascii_case() {
        let mut s = Settings::default();
        s.excluded_tags = vec!["Été".into()];
        assert!(!is_eligible(&file("a.md").with_tags(["été"]), &s));
        assert!(!is_eligible(&file("b.md").with_tags(["#ÉTÉ"]), &s));
        assert!(is_eligible(&file("c.md").with_tags(["ete"]), &s));
    }

    #[test]
    fn type_toggles_decide_the_rest() {
        let mut s = Settings::default();
        s.show_audio_files = false;
        s.show_video_files = false;
        assert!(!is_eligible(&file("clip.webm"), &s));
        s.show_video_files = true;
        assert!(is_eligible(&file("clip.webm"), &s));
        assert_eq!(shown_kind(&file("clip.webm"), &s), Some(FileKind::Video));
        s.show_audio_files = true;
        assert_eq!(shown_kind(&file("clip.webm"), &s), Some(FileKind::Audio));
        assert!(!is_eligible(&file("notes.txt"), &s));
        s.show_markdown_files = false;
        assert!(!is_eligible(&file("a.md"), &s));
    }

    #[test]
    fn eligibility_is_pure() {
        let mut s = Settings::default();
        s.excluded_folders = vec!["x".into()];
        let files = [file("x/a.md"), file("b.png"), file("c.mp3"), file("d.md")];
        let first: Vec<bool> = files.iter().map(|f| is_eligible(f, &s)).collect();
        let second: Vec<bool> = files.iter().map(|f| is_eligible(f, &s)).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![false, true, false, true]);
    }
}
