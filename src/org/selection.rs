//! Export selection
//!
//! Decides which headlines reach the output, driven by the document's
//! `#+EXPORT_SELECT_TAGS:` and `#+EXPORT_EXCLUDE_TAGS:` settings.
//!
//! Two passes over the headline list (document order; nesting is implied
//! by levels):
//!
//! 1. Selection. A headline carrying a select tag exports fully, its
//!    descendants inherit full export, and its ancestors are demoted to
//!    headline-only so the outline path stays visible. If no headline
//!    carries a select tag, everything is selected.
//! 2. Exclusion. A headline carrying an exclude tag, or a COMMENT
//!    headline, is excluded along with its whole subtree. Exclusion wins
//!    over selection.

use crate::org::headline::ExportState;
use crate::org::parser::Document;

pub fn mark_trees_for_export(doc: &mut Document) {
    let select = doc.export_select_tags();
    let exclude = doc.export_exclude_tags();

    let mut marked_any = false;
    let mut inherit_level: Option<usize> = None;
    let mut ancestors: Vec<usize> = Vec::new();

    for i in 0..doc.headlines.len() {
        doc.headlines[i].export_state = ExportState::Exclude;
        let level = doc.headlines[i].level;
        while ancestors
            .last()
            .map(|&a| level <= doc.headlines[a].level)
            .unwrap_or(false)
        {
            ancestors.pop();
        }

        if inherit_level.map(|l| level > l).unwrap_or(false) {
            doc.headlines[i].export_state = ExportState::All;
        } else {
            inherit_level = None;
            let selected = select
                .iter()
                .any(|tag| doc.headlines[i].has_tag(tag));
            if selected {
                marked_any = true;
                doc.headlines[i].export_state = ExportState::All;
                for &a in &ancestors {
                    if doc.headlines[a].export_state != ExportState::All {
                        doc.headlines[a].export_state = ExportState::HeadlineOnly;
                    }
                }
                inherit_level = Some(level);
            }
        }
        ancestors.push(i);
    }

    if !marked_any {
        for headline in &mut doc.headlines {
            headline.export_state = ExportState::All;
        }
    }

    let mut inherit_level: Option<usize> = None;
    for headline in &mut doc.headlines {
        if inherit_level.map(|l| headline.level > l).unwrap_or(false) {
            headline.export_state = ExportState::Exclude;
        } else {
            inherit_level = None;
            let excluded = exclude.iter().any(|tag| headline.has_tag(tag));
            if excluded || headline.is_comment_headline() {
                headline.export_state = ExportState::Exclude;
                inherit_level = Some(headline.level);
            }
        }
    }
}
