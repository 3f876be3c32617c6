use serde::{Deserialize, Serialize};

/// Declares a closed set of selectable options.
///
/// Every variant is tied to the value the storefront puts on the control
/// (`data-paper="80gsm"`, `<option value="business-cards">`). That value is
/// used for serde, for `parse` and for `as_str`.
macro_rules! option_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }

            /// Parses the control value. Matching ignores surrounding
            /// whitespace and ASCII case.
            pub fn parse(s: &str) -> Option<Self> {
                let normalized = s.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $( $text => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut std::fmt::Formatter<'_>,
            ) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ─── generic calculator ─────────────────────────────────────────────────────

option_enum! {
    /// Product category priced by the generic calculator.
    ProductType {
        BusinessCards => "business-cards",
        Brochures => "brochures",
        Folders => "folders",
        Reports => "reports",
        Posters => "posters",
        Banners => "banners",
    }
}

option_enum! {
    PaperType {
        Standard => "standard",
        Premium => "premium",
        Luxury => "luxury",
        Recycled => "recycled",
    }
}

option_enum! {
    FinishType {
        Matte => "matte",
        Gloss => "gloss",
        Satin => "satin",
        Velvet => "velvet",
        Uv => "uv",
    }
}

option_enum! {
    /// Ink coverage. `Bw` is black and white.
    ColorMode {
        Bw => "bw",
        Color => "color",
        Spot => "spot",
        Metallic => "metallic",
    }
}

option_enum! {
    Turnaround {
        Rush => "rush",
        Fast => "fast",
        Standard => "standard",
        Economy => "economy",
    }
}

// ─── children's book calculator ─────────────────────────────────────────────

option_enum! {
    BookType {
        Hardcover => "hardcover",
        Softcover => "softcover",
        Saddle => "saddle",
        Board => "board",
    }
}

option_enum! {
    /// Finished trim size, width x height in inches.
    TrimSize {
        Letter => "8.5x11",
        SixByNine => "6x9",
        Digest => "5.5x8.5",
        EightByTen => "8x10",
    }
}

option_enum! {
    /// Binding chosen on the children's book form. Carried through to
    /// saved quotes; the flat-rate formula does not price it.
    BookBinding {
        Sewing => "sewing",
        Perfect => "perfect",
        Saddle => "saddle",
        Spiral => "spiral",
        Hardcover => "hardcover",
    }
}

option_enum! {
    CoverStock {
        Digital => "digital",
        Offset => "offset",
        Leather => "leather",
    }
}

option_enum! {
    Lamination {
        Matte => "matte",
        Gloss => "gloss",
        Soft => "soft",
    }
}

option_enum! {
    BoardThickness {
        TwoMm => "2mm",
        TwoAndHalfMm => "2.5mm",
        ThreeMm => "3mm",
    }
}

// ─── comic book calculator ──────────────────────────────────────────────────

option_enum! {
    ComicPaper {
        Gsm80 => "80gsm",
        Gsm100 => "100gsm",
    }
}

option_enum! {
    ComicBinding {
        Saddle => "saddle",
        Perfect => "perfect",
        Hardcover => "hardcover",
    }
}

// ─── product gallery quick quote ────────────────────────────────────────────

option_enum! {
    QuickMaterial {
        Standard => "standard",
        Premium => "premium",
        Luxury => "luxury",
    }
}

option_enum! {
    QuickFinish {
        Matte => "matte",
        Gloss => "gloss",
        Velvet => "velvet",
    }
}
