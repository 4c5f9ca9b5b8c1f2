//! The bundled seed dataset. This is the read-only source of truth a run
//! translates into remote rows; names are the only keys here, identifiers
//! are assigned by the run.

use crate::model::{CategorySeed, CustomisationSeed, MenuItemSeed, SeedDataset};

fn category(name: &str, description: &str) -> CategorySeed {
    CategorySeed {
        name: name.to_string(),
        description: description.to_string(),
    }
}

fn customisation(name: &str, price: f64, kind: &str) -> CustomisationSeed {
    CustomisationSeed {
        name: name.to_string(),
        price,
        kind: kind.to_string(),
    }
}

pub fn dataset() -> SeedDataset {
    SeedDataset {
        categories: vec![
            category("Burgers", "Juicy grilled burgers"),
            category("Pizzas", "Oven-baked cheesy pizzas"),
            category("Burritos", "Rolled Mexican delights"),
            category("Bowls", "Balanced rice and salad bowls"),
            category("Wraps", "Rolled sandwiches with fillings"),
        ],
        customisations: vec![
            customisation("Extra Cheese", 1.50, "topping"),
            customisation("Jalapeños", 0.75, "topping"),
            customisation("Avocado", 2.00, "topping"),
            customisation("Fries", 2.50, "side"),
            customisation("Garlic Bread", 3.00, "side"),
            customisation("Coleslaw", 1.80, "side"),
            customisation("Large", 2.00, "size"),
            customisation("Stuffed Crust", 2.50, "crust"),
        ],
        menu: vec![
            MenuItemSeed {
                name: "Classic Cheeseburger".to_string(),
                description: "Beef patty, cheddar, lettuce, tomato, house sauce".to_string(),
                image_url: "https://images.unsplash.com/photo-1568901346375-23c9450c58cd"
                    .to_string(),
                price: 8.99,
                rating: 4.5,
                calories: 550,
                protein: 25,
                category_name: "Burgers".to_string(),
                customisations: vec![
                    "Extra Cheese".to_string(),
                    "Fries".to_string(),
                    "Large".to_string(),
                ],
            },
            MenuItemSeed {
                name: "Pepperoni Pizza".to_string(),
                description: "Tomato base, mozzarella, double pepperoni".to_string(),
                image_url: "https://images.unsplash.com/photo-1628840042765-356cda07504e"
                    .to_string(),
                price: 11.50,
                rating: 4.7,
                calories: 760,
                protein: 31,
                category_name: "Pizzas".to_string(),
                customisations: vec![
                    "Extra Cheese".to_string(),
                    "Stuffed Crust".to_string(),
                    "Garlic Bread".to_string(),
                ],
            },
            MenuItemSeed {
                name: "Bean Burrito".to_string(),
                description: "Black beans, rice, pico de gallo, cheese".to_string(),
                image_url: "https://images.unsplash.com/photo-1626700051175-6818013e1d4f"
                    .to_string(),
                price: 7.25,
                rating: 4.2,
                calories: 480,
                protein: 18,
                category_name: "Burritos".to_string(),
                customisations: vec!["Jalapeños".to_string(), "Avocado".to_string()],
            },
            MenuItemSeed {
                name: "Teriyaki Chicken Bowl".to_string(),
                description: "Grilled chicken, steamed rice, teriyaki glaze, greens".to_string(),
                image_url: "https://images.unsplash.com/photo-1546069901-ba9599a7e63c"
                    .to_string(),
                price: 9.75,
                rating: 4.6,
                calories: 620,
                protein: 34,
                category_name: "Bowls".to_string(),
                customisations: vec!["Avocado".to_string(), "Large".to_string()],
            },
            MenuItemSeed {
                name: "Falafel Wrap".to_string(),
                description: "Crispy falafel, hummus, pickled onion, tahini".to_string(),
                image_url: "https://images.unsplash.com/photo-1592044904438-36d12e2515c1"
                    .to_string(),
                price: 6.95,
                rating: 4.3,
                calories: 430,
                protein: 15,
                category_name: "Wraps".to_string(),
                customisations: vec!["Jalapeños".to_string(), "Coleslaw".to_string()],
            },
        ],
    }
}
