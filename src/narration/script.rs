use rand::Rng;

use crate::model::product::{Product, format_brl};

/// Promotional message shapes, each interpolating the product title and price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationTemplate {
    /// "Discover X, only R$ Y."
    Discovery,
    /// Before/after framing with a fictitious original price of `price * 1.5`.
    Discount,
    /// "Looking for X?"
    Question,
}

impl NarrationTemplate {
    /// Every template, in selection order.
    pub const ALL: [NarrationTemplate; 3] = [
        NarrationTemplate::Discovery,
        NarrationTemplate::Discount,
        NarrationTemplate::Question,
    ];

    /// Fill the template for `product`.
    pub fn render(self, product: &Product) -> String {
        let title = product.title.trim();
        let price = format_brl(product.price);
        match self {
            NarrationTemplate::Discovery => format!(
                "Descubra {title}! Por apenas {price}, você pode transformar sua vida. \
                 Não perca essa oportunidade única!"
            ),
            NarrationTemplate::Discount => {
                let was = format_brl(product.price * 1.5);
                format!(
                    "{title} está com desconto especial! De {was} por apenas {price}. \
                     Clique no link agora!"
                )
            }
            NarrationTemplate::Question => format!(
                "Você está procurando {title}? Esta é sua chance de conseguir por um preço \
                 incrível: {price}. Acesse já!"
            ),
        }
    }
}

/// Immutable narration text chosen for one run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NarrationScript {
    /// Template the text came from.
    pub template: NarrationTemplate,
    /// Narration text.
    pub text: String,
}

impl NarrationScript {
    /// Narration text.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for NarrationScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Picks a narration template uniformly at random.
#[derive(Clone, Copy, Debug, Default)]
pub struct NarrationScriptGenerator;

impl NarrationScriptGenerator {
    /// Choose a template with `rng` and fill it for `product`.
    pub fn generate<R: Rng + ?Sized>(&self, product: &Product, rng: &mut R) -> NarrationScript {
        let template = NarrationTemplate::ALL[rng.random_range(0..NarrationTemplate::ALL.len())];
        NarrationScript {
            template,
            text: template.render(product),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/script.rs"]
mod tests;
