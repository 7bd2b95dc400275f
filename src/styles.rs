use crate::model::{
    AlignmentDescriptor, BorderSideDescriptor, BordersDescriptor, FillDescriptor, FontDescriptor,
    GradientFillDescriptor, GradientStopDescriptor, PatternFillDescriptor, ProtectionDescriptor,
    StyleDescriptor,
};
use ahash::{AHashMap, AHasher};
use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};
use umya_spreadsheet::structs::{EnumTrait, HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::{Alignment, Border, Fill, Font, Protection, Style};

pub fn descriptor_from_style(style: &Style) -> StyleDescriptor {
    let font = style.get_font().and_then(descriptor_from_font);
    let fill = style.get_fill().and_then(descriptor_from_fill);
    let borders = style.get_borders().and_then(|borders| {
        let left = descriptor_from_border_side(borders.get_left_border());
        let right = descriptor_from_border_side(borders.get_right_border());
        let top = descriptor_from_border_side(borders.get_top_border());
        let bottom = descriptor_from_border_side(borders.get_bottom_border());
        let diagonal = descriptor_from_border_side(borders.get_diagonal_border());
        let vertical = descriptor_from_border_side(borders.get_vertical_border());
        let horizontal = descriptor_from_border_side(borders.get_horizontal_border());

        let diagonal_up = if *borders.get_diagonal_up() {
            Some(true)
        } else {
            None
        };
        let diagonal_down = if *borders.get_diagonal_down() {
            Some(true)
        } else {
            None
        };

        let descriptor = BordersDescriptor {
            left,
            right,
            top,
            bottom,
            diagonal,
            vertical,
            horizontal,
            diagonal_up,
            diagonal_down,
        };

        if descriptor.is_empty() {
            None
        } else {
            Some(descriptor)
        }
    });
    let alignment = style.get_alignment().and_then(descriptor_from_alignment);
    let protection = style.get_protection().and_then(descriptor_from_protection);
    let number_format = style.get_number_format().and_then(|fmt| {
        let code = fmt.get_format_code();
        if code.eq_ignore_ascii_case("general") {
            None
        } else {
            Some(code.to_string())
        }
    });

    StyleDescriptor {
        font,
        fill,
        borders,
        alignment,
        protection,
        number_format,
    }
}

pub fn stable_style_id(descriptor: &StyleDescriptor) -> String {
    let bytes = serde_json::to_vec(descriptor).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let hex = format!("{digest:x}");
    hex.chars().take(12).collect()
}

/// Copies every formatting component of `source` into a fresh, independently
/// owned style. Later changes to the source never reach the snapshot.
pub fn snapshot_style(source: &Style) -> Style {
    let mut style = Style::default();
    if let Some(font) = source.get_font() {
        style.set_font(font.clone());
    }
    if let Some(borders) = source.get_borders() {
        style.set_borders(borders.clone());
    }
    if let Some(fill) = source.get_fill() {
        style.set_fill(fill.clone());
    }
    if let Some(number_format) = source.get_number_format() {
        style.set_number_format(number_format.clone());
    }
    if let Some(protection) = source.get_protection() {
        style.set_protection(protection.clone());
    }
    if let Some(alignment) = source.get_alignment() {
        style.set_alignment(alignment.clone());
    }
    style
}

pub fn is_default_style(style: &Style) -> bool {
    *style == Style::default()
}

/// Cheap bucket key for a style: an ahash over the components that usually
/// tell styles apart. Borrows every string, so hashing never allocates.
/// Collisions are fine; [`StyleCache`] confirms hits with full equality.
pub fn style_fingerprint(style: &Style) -> u64 {
    let mut hasher = AHasher::default();
    if let Some(font) = style.get_font() {
        font.get_name().hash(&mut hasher);
        font.get_size().to_bits().hash(&mut hasher);
        font.get_bold().hash(&mut hasher);
        font.get_italic().hash(&mut hasher);
        font.get_color().get_argb().hash(&mut hasher);
    }
    if let Some(pattern) = style.get_fill().and_then(Fill::get_pattern_fill) {
        pattern.get_pattern_type().get_value_string().hash(&mut hasher);
        if let Some(color) = pattern.get_foreground_color() {
            color.get_argb().hash(&mut hasher);
        }
    }
    if let Some(borders) = style.get_borders() {
        borders.get_left_border().get_border_style().hash(&mut hasher);
        borders.get_top_border().get_border_style().hash(&mut hasher);
    }
    if let Some(format) = style.get_number_format() {
        format.get_format_code().hash(&mut hasher);
    }
    if let Some(alignment) = style.get_alignment() {
        alignment.get_horizontal().get_value_string().hash(&mut hasher);
        alignment.get_wrap_text().hash(&mut hasher);
    }
    hasher.finish()
}

#[derive(Debug)]
struct CachedStyle {
    source: Style,
    target: Style,
}

/// Styles already materialized for one output chunk.
///
/// umya-spreadsheet stores a full `Style` on every cell, so there is no shared
/// handle to key on. Entries are bucketed by [`style_fingerprint`] and a hit
/// additionally requires exact equality with the bucketed source style, so two
/// visually different styles never share a target.
#[derive(Debug, Default)]
pub struct StyleCache {
    entries: AHashMap<u64, Vec<CachedStyle>>,
    // (bucket key, index) of the last entry handed out
    last: Option<(u64, usize)>,
    hits: u64,
    misses: u64,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the target style for `source`, materializing it on first sight.
    ///
    /// Neighbouring cells usually share a style, so the entry returned last is
    /// checked before anything is hashed.
    pub fn get_or_materialize<F>(&mut self, source: &Style, materialize: F) -> Style
    where
        F: FnOnce(&Style) -> Style,
    {
        if let Some(target) = self
            .last_entry()
            .filter(|entry| entry.source == *source)
            .map(|entry| entry.target.clone())
        {
            self.hits += 1;
            return target;
        }

        let key = style_fingerprint(source);
        let bucket = self.entries.entry(key).or_default();
        if let Some(idx) = bucket.iter().position(|entry| entry.source == *source) {
            self.hits += 1;
            self.last = Some((key, idx));
            return bucket[idx].target.clone();
        }

        self.misses += 1;
        let target = materialize(source);
        bucket.push(CachedStyle {
            source: source.clone(),
            target: target.clone(),
        });
        self.last = Some((key, bucket.len() - 1));
        target
    }

    fn last_entry(&self) -> Option<&CachedStyle> {
        let (key, idx) = self.last?;
        self.entries.get(&key)?.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.last = None;
        self.hits = 0;
        self.misses = 0;
    }
}

fn descriptor_from_font(font: &Font) -> Option<FontDescriptor> {
    let bold = *font.get_bold();
    let italic = *font.get_italic();
    let underline = font.get_underline();
    let strikethrough = *font.get_strikethrough();
    let color = font.get_color().get_argb();

    let descriptor = FontDescriptor {
        name: Some(font.get_name().to_string()).filter(|s| !s.is_empty()),
        size: Some(*font.get_size()).filter(|s| *s > 0.0),
        bold: if bold { Some(true) } else { None },
        italic: if italic { Some(true) } else { None },
        underline: if underline.eq_ignore_ascii_case("none") {
            None
        } else {
            Some(underline.to_string())
        },
        strikethrough: if strikethrough { Some(true) } else { None },
        color: Some(color.to_string()).filter(|s| !s.is_empty()),
    };

    if descriptor.is_empty() {
        None
    } else {
        Some(descriptor)
    }
}

fn descriptor_from_fill(fill: &Fill) -> Option<FillDescriptor> {
    if let Some(pattern) = fill.get_pattern_fill() {
        let pattern_type = pattern.get_pattern_type();
        let kind = pattern_type.get_value_string();
        let fg = pattern
            .get_foreground_color()
            .map(|c| c.get_argb().to_string())
            .filter(|s| !s.is_empty());
        let bg = pattern
            .get_background_color()
            .map(|c| c.get_argb().to_string())
            .filter(|s| !s.is_empty());

        if kind.eq_ignore_ascii_case("none") && fg.is_none() && bg.is_none() {
            return None;
        }

        return Some(FillDescriptor::Pattern(PatternFillDescriptor {
            pattern_type: if kind.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(kind.to_string())
            },
            foreground_color: fg,
            background_color: bg,
        }));
    }

    if let Some(gradient) = fill.get_gradient_fill() {
        let stops: Vec<GradientStopDescriptor> = gradient
            .get_gradient_stop()
            .iter()
            .map(|stop| GradientStopDescriptor {
                position: *stop.get_position(),
                color: stop.get_color().get_argb().to_string(),
            })
            .collect();

        let degree = *gradient.get_degree();
        if stops.is_empty() && degree == 0.0 {
            return None;
        }

        return Some(FillDescriptor::Gradient(GradientFillDescriptor {
            degree: Some(degree).filter(|d| *d != 0.0),
            stops,
        }));
    }

    None
}

fn descriptor_from_border_side(border: &Border) -> Option<BorderSideDescriptor> {
    let style = border.get_border_style();
    let style = if style.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(style.to_string())
    };
    let color = Some(border.get_color().get_argb().to_string()).filter(|s| !s.is_empty());

    let descriptor = BorderSideDescriptor { style, color };
    if descriptor.is_empty() {
        None
    } else {
        Some(descriptor)
    }
}

fn descriptor_from_alignment(alignment: &Alignment) -> Option<AlignmentDescriptor> {
    let horizontal = if alignment.get_horizontal() != &HorizontalAlignmentValues::General {
        Some(alignment.get_horizontal().get_value_string().to_string())
    } else {
        None
    };
    let vertical = if alignment.get_vertical() != &VerticalAlignmentValues::Bottom {
        Some(alignment.get_vertical().get_value_string().to_string())
    } else {
        None
    };
    let wrap_text = if *alignment.get_wrap_text() {
        Some(true)
    } else {
        None
    };
    let text_rotation = if *alignment.get_text_rotation() != 0 {
        Some(*alignment.get_text_rotation())
    } else {
        None
    };

    let descriptor = AlignmentDescriptor {
        horizontal,
        vertical,
        wrap_text,
        text_rotation,
    };
    if descriptor.is_empty() {
        None
    } else {
        Some(descriptor)
    }
}

fn descriptor_from_protection(protection: &Protection) -> Option<ProtectionDescriptor> {
    // `Protection::get_hidden` takes `&mut self`.
    let hidden = *protection.clone().get_hidden();
    Some(ProtectionDescriptor {
        locked: Some(*protection.get_locked()),
        hidden: Some(hidden),
    })
}

trait IsEmpty {
    fn is_empty(&self) -> bool;
}

impl IsEmpty for FontDescriptor {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.strikethrough.is_none()
            && self.color.is_none()
    }
}

impl IsEmpty for BorderSideDescriptor {
    fn is_empty(&self) -> bool {
        self.style.is_none() && self.color.is_none()
    }
}

impl IsEmpty for BordersDescriptor {
    fn is_empty(&self) -> bool {
        self.left.is_none()
            && self.right.is_none()
            && self.top.is_none()
            && self.bottom.is_none()
            && self.diagonal.is_none()
            && self.vertical.is_none()
            && self.horizontal.is_none()
            && self.diagonal_up.is_none()
            && self.diagonal_down.is_none()
    }
}

impl IsEmpty for AlignmentDescriptor {
    fn is_empty(&self) -> bool {
        self.horizontal.is_none()
            && self.vertical.is_none()
            && self.wrap_text.is_none()
            && self.text_rotation.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umya_spreadsheet::{NumberingFormat, PatternValues};

    fn bold_red() -> Style {
        let mut style = Style::default();
        style.get_font_mut().set_bold(true);
        style
            .get_fill_mut()
            .get_pattern_fill_mut()
            .set_pattern_type(PatternValues::Solid)
            .get_foreground_color_mut()
            .set_argb("FFFF0000");
        style
            .get_number_format_mut()
            .set_format_code(NumberingFormat::FORMAT_NUMBER_00);
        style
    }

    #[test]
    fn snapshot_is_independent_of_source() {
        let mut source = bold_red();
        let snapshot = snapshot_style(&source);
        assert_eq!(descriptor_from_style(&snapshot), descriptor_from_style(&source));

        source.get_font_mut().set_bold(false);
        let font = descriptor_from_style(&snapshot).font.expect("font");
        assert_eq!(font.bold, Some(true));
    }

    #[test]
    fn stable_id_is_deterministic_and_discriminating() {
        let a = stable_style_id(&descriptor_from_style(&bold_red()));
        let b = stable_style_id(&descriptor_from_style(&bold_red()));
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);

        let mut italic = Style::default();
        italic.get_font_mut().set_italic(true);
        assert_ne!(a, stable_style_id(&descriptor_from_style(&italic)));
    }

    #[test]
    fn cache_reuses_equal_styles() {
        let mut cache = StyleCache::new();
        let first = cache.get_or_materialize(&bold_red(), snapshot_style);
        let second = cache.get_or_materialize(&bold_red(), |_| panic!("should hit cache"));
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_separates_distinct_styles() {
        let mut cache = StyleCache::new();
        let mut italic = Style::default();
        italic.get_font_mut().set_italic(true);

        cache.get_or_materialize(&bold_red(), snapshot_style);
        let target = cache.get_or_materialize(&italic, snapshot_style);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            descriptor_from_style(&target).font.and_then(|f| f.italic),
            Some(true)
        );

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.hits(), 0);
    }

    #[test]
    fn fingerprint_is_stable_and_tracks_content() {
        assert_eq!(style_fingerprint(&bold_red()), style_fingerprint(&bold_red()));
        assert_eq!(
            style_fingerprint(&bold_red()),
            style_fingerprint(&snapshot_style(&bold_red()))
        );

        let mut blue = bold_red();
        blue.get_fill_mut()
            .get_pattern_fill_mut()
            .get_foreground_color_mut()
            .set_argb("FF0000FF");
        assert_ne!(style_fingerprint(&bold_red()), style_fingerprint(&blue));
    }

    #[test]
    fn alternating_styles_hit_through_buckets() {
        let mut cache = StyleCache::new();
        let mut italic = Style::default();
        italic.get_font_mut().set_italic(true);

        for _ in 0..3 {
            cache.get_or_materialize(&bold_red(), snapshot_style);
            cache.get_or_materialize(&italic, snapshot_style);
        }
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.hits(), 4);

        // Styles equal only in their fingerprinted parts still get their own entry.
        let mut struck = bold_red();
        struck.get_font_mut().set_strikethrough(true);
        let target = cache.get_or_materialize(&struck, snapshot_style);
        assert_eq!(target, snapshot_style(&struck));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn protection_flags_reach_the_descriptor() {
        let mut style = Style::default();
        style.get_protection_mut().set_hidden(true);
        style.get_protection_mut().set_locked(false);

        let protection = descriptor_from_style(&style).protection.expect("protection");
        assert_eq!(protection.hidden, Some(true));
        assert_eq!(protection.locked, Some(false));
    }

    #[test]
    fn default_style_detection() {
        assert!(is_default_style(&Style::default()));
        assert!(!is_default_style(&bold_red()));
    }
}
