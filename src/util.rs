use eframe::egui::Vec2;

/// Point `distance` along the line from `from` toward `toward`.
pub fn offset_point(from: Vec2, toward: Vec2, distance: f32) -> Vec2 {
    let delta = toward - from;
    let length = delta.length();
    let length = if length > 0.0 { length } else { 1.0 };
    from + delta / length * distance
}

pub fn distance_to_segment(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - start).length();
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    (point - (start + segment * t)).length()
}

pub fn display_or_dash(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.is_empty() { "—" } else { trimmed }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn offset_point_walks_toward_target() {
        let point = offset_point(vec2(0.0, 0.0), vec2(10.0, 0.0), 4.0);
        assert_eq!(point, vec2(4.0, 0.0));

        let same = offset_point(vec2(3.0, 3.0), vec2(3.0, 3.0), 5.0);
        assert_eq!(same, vec2(3.0, 3.0));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let start = vec2(0.0, 0.0);
        let end = vec2(10.0, 0.0);
        assert_eq!(distance_to_segment(vec2(5.0, 3.0), start, end), 3.0);
        assert_eq!(distance_to_segment(vec2(13.0, 4.0), start, end), 5.0);
        assert_eq!(distance_to_segment(vec2(0.0, 2.0), start, start), 2.0);
    }

    #[test]
    fn blank_text_renders_as_dash() {
        assert_eq!(display_or_dash("  "), "—");
        assert_eq!(display_or_dash(" note "), "note");
    }
}
