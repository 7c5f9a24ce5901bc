//! Built-in page copy and theme. Used whenever the store holds no usable
//! override; never persisted on its own.

use super::content::Section;
use super::theme::ThemeKey;

pub type FieldDefaults = &'static [(&'static str, &'static str)];

const HERO: FieldDefaults = &[
    ("tagline", "Empowering Women Through Fitness"),
    ("title", "Strong. Confident. Empowered."),
    (
        "subtitle",
        "Reach your fitness goals without stress or confusion. I'm here to guide you every step of the way with personalized training that fits your lifestyle.",
    ),
    ("buttonText", "Start Your Journey"),
];

const ABOUT: FieldDefaults = &[
    ("title", "Meet Your Personal Trainer"),
    (
        "description",
        "Hi, I'm Sophie! I'm a 27-year-old personal trainer passionate about helping women feel empowered through fitness. I believe fitness should be enjoyable, not intimidating. Whether you're just starting out or looking to level up, I'll create a plan that works for you\u{2014}no stress, no confusion, just results and confidence.",
    ),
    ("image", "/professional-female-personal-trainer-smiling-confi.jpg"),
    ("statsNumber", "500+"),
    ("statsLabel", "Women Empowered"),
];

const SERVICES: FieldDefaults = &[
    ("title", "How I Can Help"),
    ("subtitle", "Choose the service that fits your lifestyle and goals"),
    ("service1Title", "1-on-1 Training"),
    (
        "service1Description",
        "Personalized in-person sessions tailored to your goals, fitness level, and schedule. Get hands-on guidance and motivation.",
    ),
    ("service2Title", "Online Coaching"),
    (
        "service2Description",
        "Train anywhere with custom workout plans, video demonstrations, and ongoing support through our app.",
    ),
    ("service3Title", "Nutrition Guidance"),
    (
        "service3Description",
        "Simple, sustainable nutrition advice that complements your training and helps you feel your best inside and out.",
    ),
];

const TESTIMONIALS: FieldDefaults = &[
    ("title", "Success Stories"),
    ("subtitle", "Real transformations from real women"),
    (
        "testimonial1Text",
        "\"Sophie completely transformed my relationship with fitness. I went from dreading workouts to actually looking forward to them! Down 2 dress sizes and feeling stronger than ever.\"",
    ),
    ("testimonial1Name", "Emma"),
    ("testimonial1Age", "Age 34"),
    (
        "testimonial2Text",
        "\"Best decision I ever made! Sophie's approach is so refreshing\u{2014}no judgment, just genuine support. I've gained so much confidence and strength in just 3 months.\"",
    ),
    ("testimonial2Name", "Rachel"),
    ("testimonial2Age", "Age 29"),
    (
        "testimonial3Text",
        "\"I was so intimidated by gyms before working with Sophie. She made everything feel achievable and fun. Now I'm lifting weights I never thought possible and feeling amazing!\"",
    ),
    ("testimonial3Name", "Jessica"),
    ("testimonial3Age", "Age 42"),
];

pub fn section_defaults(section: Section) -> FieldDefaults {
    match section {
        Section::Hero => HERO,
        Section::About => ABOUT,
        Section::Services => SERVICES,
        Section::Testimonials => TESTIMONIALS,
    }
}

pub fn theme_default(key: ThemeKey) -> &'static str {
    match key {
        ThemeKey::PrimaryColor => "#ec4899",
        ThemeKey::SecondaryColor => "#a855f7",
        ThemeKey::AccentColor => "#10b981",
        ThemeKey::FontFamily => "Montserrat",
    }
}
