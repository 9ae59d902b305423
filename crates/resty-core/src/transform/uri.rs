use crate::parse::parameter::ParamSpecs;

/// Path component of a base URI. Template placeholders such as `{version}`
/// are kept verbatim, so this does not go through a URL parser that would
/// percent-encode them.
///
/// - `https://api.example.com/v1` → `/v1`
/// - `https://{host}/api/{version}?x=1` → `/api/{version}`
/// - `/api` → `/api`
/// - `https://api.example.com` → ``
pub fn uri_path(base_uri: &str) -> &str {
    let rest = strip_scheme(base_uri).unwrap_or(base_uri);

    let path = match rest.strip_prefix("//") {
        Some(authority) => match authority.find(['/', '?', '#']) {
            Some(end) => &authority[end..],
            None => "",
        },
        None => rest,
    };

    match path.find(['?', '#']) {
        Some(end) => &path[..end],
        None => path,
    }
}

fn strip_scheme(uri: &str) -> Option<&str> {
    let (scheme, rest) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(rest)
}

/// Placeholder names (`{name}`) appearing in a URI template, in order.
pub fn placeholders(uri: &str) -> impl Iterator<Item = &str> {
    uri.split('{')
        .skip(1)
        .filter_map(|part| part.split_once('}').map(|(name, _)| name))
}

/// Keep only the parameters whose `{name}` placeholder appears in `uri`.
pub fn filter_uri_parameters(params: &ParamSpecs, uri: &str) -> ParamSpecs {
    params
        .iter()
        .filter(|(name, _)| uri.contains(&format!("{{{name}}}")))
        .map(|(name, spec)| (name.clone(), spec.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parameter::ParamSpec;

    #[test]
    fn test_uri_path() {
        assert_eq!(uri_path("https://api.example.com/v1"), "/v1");
        assert_eq!(uri_path("https://{host}/api/{version}?x=1"), "/api/{version}");
        assert_eq!(uri_path("/api"), "/api");
        assert_eq!(uri_path("https://api.example.com"), "");
        assert_eq!(uri_path("//cdn.example.com/assets#top"), "/assets");
        assert_eq!(uri_path(""), "");
    }

    #[test]
    fn test_placeholders() {
        let names: Vec<&str> = placeholders("/api/{version}/users/{userId}").collect();
        assert_eq!(names, ["version", "userId"]);
        assert_eq!(placeholders("/plain").count(), 0);
    }

    #[test]
    fn test_filter_uri_parameters() {
        let mut params = ParamSpecs::new();
        params.insert("version".to_string(), ParamSpec::default());
        params.insert("region".to_string(), ParamSpec::default());

        let kept = filter_uri_parameters(&params, "/api/{version}/items");
        assert_eq!(kept.keys().collect::<Vec<_>>(), ["version"]);
        assert!(filter_uri_parameters(&params, "/api/version").is_empty());
    }
}
