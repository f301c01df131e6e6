/// Sanitizes user-supplied free text (titles, notes, subjects) before it is stored.
///
/// Whitelist-based: harmless formatting tags survive, `<script>` and friends
/// are removed together with their content, and event-handler attributes are dropped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input).trim().to_string()
}
