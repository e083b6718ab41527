//! Seed content written the first time a collection is read.

use serde_json::{Map, Value};

use crate::domain::{BlogPost, ContactMessage, Property, PropertyStatus, SiteSettings, Testimonial};

const DEFAULT_HERO_IMAGE: &str =
    "https://i.ibb.co/cXVKpwLb/494587849-122220979700179532-2068541873255690295-n.jpg";

pub fn default_settings() -> SiteSettings {
    SiteSettings {
        logo_url: "https://i.ibb.co/RTYQxH6x/logo-png.png".to_string(),
        hero_image_url: DEFAULT_HERO_IMAGE.to_string(),
        hero_images: vec![
            DEFAULT_HERO_IMAGE.to_string(),
            "https://images.unsplash.com/photo-1600607687939-ce8a6c25118c?ixlib=rb-4.0.3&auto=format&fit=crop&w=1920&q=80".to_string(),
            "https://images.unsplash.com/photo-1560518883-ce09059eeffa?ixlib=rb-4.0.3&auto=format&fit=crop&w=1920&q=80".to_string(),
            "https://images.unsplash.com/photo-1448630360428-65456885c650?ixlib=rb-4.0.3&auto=format&fit=crop&w=1920&q=80".to_string(),
        ],
        about_image_url:
            "https://i.ibb.co/fzHDJP6S/Whats-App-Image-2026-01-22-at-4-48-28-PM.jpg".to_string(),
        why_us_image_url: "https://i.ibb.co/1G9QszBJ/Gemini-Generated-Image-lrkbqjlrkbqjlrkb.png"
            .to_string(),
        contact_phone: "+254 794 132 637".to_string(),
        contact_email: "modelland18@gmail.com".to_string(),
        testimonial_video_url: "https://www.youtube.com/embed/dQw4w9WgXcQ?si=placeholder"
            .to_string(),
        social_facebook: "https://www.facebook.com/modellandinvestment".to_string(),
        social_instagram: "https://www.instagram.com/modellandinvestment".to_string(),
        social_x: "https://x.com/modellandinvestment".to_string(),
        social_youtube: "https://www.youtube.com/@modellandinvestment".to_string(),
        social_tiktok: "https://www.tiktok.com/@modellandinvestment".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: &str,
    title: &str,
    location: &str,
    price: &str,
    deposit: &str,
    payment_plan: &str,
    image: &str,
    features: [&str; 2],
    status: PropertyStatus,
) -> Property {
    Property {
        id: id.to_string(),
        title: title.to_string(),
        location: location.to_string(),
        price: price.to_string(),
        deposit: deposit.to_string(),
        payment_plan: payment_plan.to_string(),
        size: "1/8 Acre".to_string(),
        image: image.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        status,
    }
}

/// [`default_settings`] as a JSON object, the base that stored settings merge over.
pub fn default_settings_map() -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(default_settings())?)
}

pub fn default_properties() -> Vec<Property> {
    vec![
        property(
            "1",
            "Hope Gardens Phase I",
            "Naserian, next to Naserian primary",
            "KES 350,000",
            "KES 50,000",
            "12 Months",
            "https://i.ibb.co/wNYpbfqJ/Hope-Gardens-Phase-I-png.jpg",
            ["Ready Title", "Flexible Plan"],
            PropertyStatus::SellingFast,
        ),
        property(
            "2",
            "Hope Gardens Phase II",
            "Naserian, 3km from KCA Uni",
            "KES 450,000",
            "KES 50,000",
            "12 Months",
            "https://i.ibb.co/d0FsrPLt/Hope-Gardens-Phase-II-png.jpg",
            ["Ready Title", "Flexible Plan"],
            PropertyStatus::Available,
        ),
        property(
            "3",
            "KCA Phase 5",
            "KCA University",
            "KES 450,000",
            "KES 50,000",
            "15 Months",
            "https://i.ibb.co/DFmBNmr/KCA-Phase-5-png.jpg",
            ["Ready Title", "Commercial Plots"],
            PropertyStatus::Available,
        ),
        property(
            "4",
            "Royal Gardens Phase II",
            "Kisaju, 3km off Namanga Rd",
            "KES 900,000",
            "KES 100,000",
            "15 Months",
            "https://i.ibb.co/twsqT8w2/Royal-Gardens-Phase-II-png.jpg",
            ["Ready Title", "Prime Location"],
            PropertyStatus::Available,
        ),
    ]
}

fn testimonial(id: &str, name: &str, role: &str, quote: &str, image: &str) -> Testimonial {
    Testimonial {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        quote: quote.to_string(),
        image: image.to_string(),
    }
}

pub fn default_testimonials() -> Vec<Testimonial> {
    vec![
        testimonial(
            "1",
            "James Kamau",
            "Homeowner, Hope Gardens",
            "Model Land Investment made my dream of owning land a reality. The process was transparent, and I received my title deed within 30 days as promised. Highly recommended!",
            "https://picsum.photos/100/100?random=101",
        ),
        testimonial(
            "2",
            "Sarah Wanjiku",
            "Investor, KCA Phase 5",
            "I was looking for a secure investment for my family. The team at Model Land was professional and guided me to the perfect plot near KCA University. Great value for money.",
            "https://picsum.photos/100/100?random=102",
        ),
        testimonial(
            "3",
            "David Omondi",
            "Business Owner, Kitengela",
            "The payment plans are very flexible. I managed to pay for my plot in Royal Gardens in installments without any pressure. Thank you Model Land for empowering us.",
            "https://picsum.photos/100/100?random=103",
        ),
        testimonial(
            "4",
            "Mercy Njeri",
            "Diaspora Client",
            "Investing from abroad can be scary, but Model Land Investment kept me updated at every step with photos and videos. I felt like I was there in person. Honest and reliable.",
            "https://picsum.photos/100/100?random=104",
        ),
    ]
}

pub fn default_blog_posts() -> Vec<BlogPost> {
    vec![
        BlogPost {
            id: "1".to_string(),
            title: "Why Investing in Kitengela is a Goldmine".to_string(),
            excerpt: "Kitengela has grown from a dusty town to a real estate hotspot. Here is why you should consider investing now.".to_string(),
            content: "Kitengela is currently one of the fastest-growing towns in Kenya. With the expansion of the Namanga road and the influx of industries, land value has appreciated by over 200% in the last 5 years. \n\nInvestors are flocking to areas like Kisaju and Naserian because of the affordability and the promise of infrastructure development. At Model Land Investment, we have seen first-hand how our clients have reaped benefits by buying early. \n\nWhether you are looking for residential land to build a home or commercial land for speculation, Kitengela offers a diverse range of options.".to_string(),
            image: "https://images.unsplash.com/photo-1542601906990-b4d3fb7d5c73?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80".to_string(),
            date: "2024-02-15".to_string(),
            author: "Model Land Team".to_string(),
        },
        BlogPost {
            id: "2".to_string(),
            title: "Understanding Title Deeds in Kenya".to_string(),
            excerpt: "The process of land ownership can be complex. We break down the different types of title deeds and what to look for.".to_string(),
            content: "A title deed is the ultimate proof of land ownership. In Kenya, there are Freehold and Leasehold titles. \n\n1. **Freehold**: Absolute ownership of the land for an indefinite period. Most agricultural lands are freehold. \n2. **Leasehold**: Ownership for a specific period (e.g., 99 years), usually subject to paying annual rates to the government.\n\nAt Model Land Investment, we ensure all our plots have ready Freehold title deeds, giving you peace of mind and absolute ownership.".to_string(),
            image: "https://images.unsplash.com/photo-1560518883-ce09059eeffa?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80".to_string(),
            date: "2024-03-10".to_string(),
            author: "Legal Department".to_string(),
        },
    ]
}

pub fn default_messages() -> Vec<ContactMessage> {
    Vec::new()
}
