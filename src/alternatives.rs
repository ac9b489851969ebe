//! Static replacement suggestions for well-known packages

use crate::types::AlternativeSuggestion;

const ALTERNATIVES: &[(&str, &str, &str)] = &[
    ("moment", "dayjs", "moment is in maintenance mode; dayjs offers a compatible API at a fraction of the size"),
    ("request", "undici", "request has been deprecated since 2020"),
    ("request-promise", "undici", "depends on the deprecated request package"),
    ("node-sass", "sass", "node-sass is deprecated in favour of Dart Sass"),
    ("tslint", "eslint", "tslint is deprecated; typescript-eslint replaces it"),
    ("colors", "picocolors", "colors had a sabotaged release and is unmaintained"),
    ("chalk", "picocolors", "picocolors is smaller and has no dependencies"),
    ("underscore", "lodash-es", "lodash-es is tree-shakeable"),
    ("left-pad", "String.prototype.padStart", "padding is built into the language"),
    ("querystring", "URLSearchParams", "the querystring module is legacy; URLSearchParams is built in"),
    ("mkdirp", "fs.mkdir", "fs.mkdir supports { recursive: true } natively"),
    ("rimraf", "fs.rm", "fs.rm supports { recursive: true } natively"),
    ("bluebird", "Promise", "native promises cover most use cases"),
    ("body-parser", "express.json", "express ships its own body parsers since 4.16"),
    ("istanbul", "c8", "istanbul is unmaintained; c8 uses native V8 coverage"),
    ("uglify-js", "terser", "terser supports modern syntax"),
];

/// Suggested replacement for a package, if one is known
pub fn lookup(name: &str) -> Option<AlternativeSuggestion> {
    ALTERNATIVES
        .iter()
        .find(|(package, _, _)| *package == name)
        .map(|(_, alternative, reason)| AlternativeSuggestion {
            name: alternative.to_string(),
            reason: reason.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_package() {
        let suggestion = lookup("moment").unwrap();
        assert_eq!(suggestion.name, "dayjs");
        assert!(!suggestion.reason.is_empty());
    }

    #[test]
    fn test_unknown_package() {
        assert!(lookup("express").is_none());
        assert!(lookup("Moment").is_none());
    }
}
