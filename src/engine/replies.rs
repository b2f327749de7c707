//! Chat replies. Formatting uses WhatsApp-style `*bold*`.

use crate::engine::economy::{InventoryView, Purchase, SaleReceipt, ShopListing};
use crate::engine::error::GameError;
use crate::engine::game_data::Category;
use crate::engine::mechanics::Catch;

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Common => "comum",
        Category::Rare => "⭐ RARO ⭐",
        Category::Junk => "lixo",
    }
}

pub fn catch_message(catch: &Catch) -> String {
    let mut message = String::from("🎣 *Pescaria Realizada!*\n");
    message.push_str(&format!("Você pescou: *{}*\n", catch.species));
    message.push_str(&format!("Tipo: {}\n\n", category_label(catch.category)));
    message.push_str("Use /inventario para ver seus itens");
    message
}

pub fn inventory_message(view: &InventoryView<'_>) -> String {
    let mut message = String::from("💰 *Inventário*\n");
    message.push_str(&format!("Dinheiro: R$ {}\n", view.money));
    message.push_str(&format!("Vara: {}\n", view.rod));
    message.push_str(&format!("Iscas: {}\n\n", view.bait_count));
    message.push_str("*Itens:*\n");

    if view.items.is_empty() {
        message.push_str("Nenhum item encontrado\n");
    } else {
        for (item, count) in &view.items {
            message.push_str(&format!("{}: {}\n", item, count));
        }
    }

    message.push_str("\nUse /vender para vender peixes");
    message
}

pub fn sale_message(receipt: &SaleReceipt) -> String {
    let sold: Vec<String> = receipt
        .lines
        .iter()
        .map(|line| format!("{} ({}x)", line.item, line.count))
        .collect();

    format!(
        "💰 *Venda Realizada!*\nItens vendidos: {}\nTotal: R$ {}\nSaldo atual: R$ {}",
        sold.join(", "),
        receipt.total,
        receipt.balance
    )
}

pub fn shop_message(balance: u64, listing: &[ShopListing]) -> String {
    let mut message = String::from("🛒 *Loja de Pesca*\n\n");
    message.push_str(&format!("Seu saldo: R$ {}\n\n", balance));
    message.push_str("*Itens disponíveis:*\n");

    for entry in listing {
        let mark = if entry.owned { "✅" } else { "❌" };
        let note = if entry.equipped { " (equipada)" } else { "" };
        message.push_str(&format!("{} {}{} - R$ {}\n", mark, entry.name, note, entry.price));
    }

    message.push_str("\nUse /comprar [item] para comprar");
    message
}

pub fn purchase_message(purchase: &Purchase) -> String {
    match purchase {
        Purchase::Rod { name, .. } => format!("✅ {} comprada com sucesso!", name),
        Purchase::Bait { name, bait_count, .. } => format!("✅ {} comprada! Iscas: {}", name, bait_count),
    }
}

pub fn game_error_message(error: &GameError) -> String {
    match error {
        GameError::ItemNotFound(_) => "❌ Item não encontrado na loja!".to_string(),
        GameError::InsufficientFunds { price, balance } => {
            format!("❌ Saldo insuficiente! Preço: R$ {} | Seu saldo: R$ {}", price, balance)
        }
        GameError::UnknownItemCategory(_) => "❌ Não foi possível comprar o item".to_string(),
        GameError::NothingToSell => "❌ Nenhum peixe para vender!".to_string(),
    }
}

pub fn storage_failure_message() -> String {
    "⚠️ Não foi possível acessar seus dados agora. Tente novamente mais tarde.".to_string()
}

pub fn ranking_message() -> String {
    "🏆 *Ranking em desenvolvimento*\nEm breve teremos um ranking global!".to_string()
}

pub fn help_message() -> String {
    concat!(
        "🎣 *Bot de Pesca - Ajuda*\n\n",
        "/pescar - Inicia uma pescaria\n",
        "/inventario - Mostra seus itens\n",
        "/vender - Vende todos os peixes\n",
        "/loja - Mostra itens para comprar\n",
        "/comprar [item] - Compra um item\n",
        "/ranking - Mostra o ranking\n\n",
        "Boa pescaria! 🎣"
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::economy::SoldLine;

    #[test]
    fn test_rare_catch_is_highlighted() {
        let catch = Catch { category: Category::Rare, species: "Dourado".to_string() };
        let text = catch_message(&catch);
        assert!(text.contains("*Dourado*"));
        assert!(text.contains("⭐ RARO ⭐"));
    }

    #[test]
    fn test_empty_inventory_message() {
        let view = InventoryView { money: 100, rod: "Vara Básica", bait_count: 0, items: vec![] };
        let text = inventory_message(&view);
        assert!(text.contains("Dinheiro: R$ 100"));
        assert!(text.contains("Nenhum item encontrado"));
    }

    #[test]
    fn test_sale_message_lists_lines() {
        let receipt = SaleReceipt {
            lines: vec![
                SoldLine { item: "Carpa".to_string(), count: 2, subtotal: 24 },
                SoldLine { item: "Atum".to_string(), count: 1, subtotal: 150 },
            ],
            total: 174,
            balance: 274,
        };
        let text = sale_message(&receipt);
        assert!(text.contains("Carpa (2x), Atum (1x)"));
        assert!(text.contains("Total: R$ 174"));
        assert!(text.contains("Saldo atual: R$ 274"));
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_message();
        for cmd in ["/pescar", "/inventario", "/vender", "/loja", "/comprar", "/ranking"] {
            assert!(help.contains(cmd), "help is missing {}", cmd);
        }
    }
}
