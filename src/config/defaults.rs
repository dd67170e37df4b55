//! Default values for configuration sections.
//!
//! Each submodule mirrors a section of `freshmap.toml` and provides the
//! default used both by serde (missing field) and `Default` construction.

pub mod site {
    pub fn timezone() -> String {
        "-05:00".to_owned()
    }
}

pub mod previous {
    pub fn git_ref() -> String {
        "HEAD".to_owned()
    }

    pub fn git_path() -> String {
        "sitemap-internal.xml".to_owned()
    }
}

pub mod fetch {
    pub fn timeout() -> u64 {
        10
    }

    pub fn user_agent() -> String {
        concat!("freshmap/", env!("CARGO_PKG_VERSION")).to_owned()
    }
}

pub mod filter {
    pub fn skip_extensions() -> Vec<String> {
        [".js", ".css", ".json", ".zip", ".bib", ".key", ".png", ".jpg"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub fn reserved_names() -> Vec<String> {
        [
            "index.html",
            "404.html",
            "sitemap.xml",
            "sitemap-internal.xml",
            "robots.txt",
            "LICENSE",
            "cv.pdf",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }
}

pub mod external {
    pub fn online() -> bool {
        true
    }
}
