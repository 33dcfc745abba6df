//! Website archetypes with fixed prompt blocks.

use std::fmt;

/// A known website archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    LandingPage,
    Portfolio,
    Blog,
    Ecommerce,
    Documentation,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::LandingPage,
        Preset::Portfolio,
        Preset::Blog,
        Preset::Ecommerce,
        Preset::Documentation,
    ];

    /// Stable key used on the command line and as a template directory name.
    pub fn key(self) -> &'static str {
        match self {
            Preset::LandingPage => "landing-page",
            Preset::Portfolio => "portfolio",
            Preset::Blog => "blog",
            Preset::Ecommerce => "ecommerce",
            Preset::Documentation => "documentation",
        }
    }

    /// Case-insensitive lookup by key.
    pub fn parse(key: &str) -> Option<Preset> {
        let key = key.trim();
        Preset::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key))
    }

    pub fn summary(self) -> &'static str {
        match self {
            Preset::LandingPage => "Hero, features, testimonials, pricing and signup",
            Preset::Portfolio => "Personal intro, project grid, skills and contact",
            Preset::Blog => "Featured posts, listing, sidebar and subscription footer",
            Preset::Ecommerce => "Product gallery, options, cart, reviews",
            Preset::Documentation => "Sidebar navigation, code examples, table of contents",
        }
    }

    /// The instructional block prepended to the user's requirements.
    pub fn instructions(self) -> &'static str {
        match self {
            Preset::LandingPage => {
                "\
Generate a modern landing page with:
- Hero section with compelling headline and clear call-to-action button
- Features/benefits section with icons or illustrations
- Testimonials section with customer reviews
- Pricing section (if applicable)
- Contact form or signup section
- Footer with social links and additional navigation
- Responsive design that works perfectly on mobile and desktop
- Modern, attractive styling with appropriate whitespace and typography"
            }
            Preset::Portfolio => {
                "\
Generate a professional portfolio website with:
- Hero section with personal introduction and profile picture area
- Projects showcase section with grid layout, project images, and descriptions
- Skills/technologies section with visual indicators or icons
- About me section with detailed background information
- Contact information with working links
- Clean, professional design with good typography and spacing
- Responsive design that works on all devices"
            }
            Preset::Blog => {
                "\
Generate a blog website with:
- Header with site logo and navigation menu
- Featured posts section with highlighted content
- Blog post listing with excerpts, publication dates, and categories
- Sidebar for categories, tags, or author information
- Footer with subscription option, recent posts, and social links
- Clean, readable typography with good contrast
- Responsive design optimized for reading on all devices"
            }
            Preset::Ecommerce => {
                "\
Generate an e-commerce product page with:
- Product image gallery with thumbnail navigation
- Product title, price, and description
- Product options selection (size, color, etc.)
- Add to cart button with quantity selector
- Product details and specifications tabs
- Customer reviews section
- Related products suggestions
- Responsive design optimized for conversions"
            }
            Preset::Documentation => {
                "\
Generate a documentation website with:
- Sidebar navigation with collapsible sections
- Main content area with proper documentation formatting
- Code examples with syntax highlighting
- Table of contents for quick navigation
- Search functionality placeholder
- Responsive design that works well for technical content
- Clean, professional styling focused on readability"
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_parse() {
        for preset in Preset::ALL {
            assert_eq!(Preset::parse(preset.key()), Some(preset));
        }
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(Preset::parse("  Landing-Page "), Some(Preset::LandingPage));
        assert_eq!(Preset::parse("landing"), None);
        assert_eq!(Preset::parse(""), None);
    }

    #[test]
    fn every_preset_has_instructions() {
        for preset in Preset::ALL {
            assert!(preset.instructions().starts_with("Generate "));
            assert!(preset.instructions().contains("Responsive"));
        }
    }
}
