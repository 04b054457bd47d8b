// Source texts shared by the integration tests

/// Two chapters with dialogue, a crutch phrase and a clear mood swing
pub const CHAPTER_TEXT: &str = "\
CAPÍTULO 1 - A chegada
Numa manhã clara, Marina chegou feliz à vila. O sol brilhava e todos sorriam com alegria.
Marina abraçou Tomás na praça. \"Que bom te ver\", disse Tomás, contente e tranquilo.
De repente, a música encheu a rua de esperança e de amor.

CAPÍTULO 2 - A tempestade
À noite, a tempestade destruiu o porto. Marina chorou de medo e de raiva.
— Perdemos tudo! — gritou Tomás, desesperado.
O frio, a dor e a tristeza tomaram a casa escura. Ninguém dormiu naquela noite terrível.
";

/// Kaelin written nine times, kaelin once, Bryn twice and Brynn once
pub fn name_variants_text() -> String {
    let mut text = String::new();
    for _ in 0..9 {
        text.push_str("A estrada levou Kaelin ao norte.\n");
    }
    text.push_str("A chuva molhou kaelin outra vez.\n");
    text.push_str("O barco de Bryn partiu. O remo de Bryn quebrou.\n");
    text.push_str("A voz de Brynn ecoou.\n");
    text
}

/// Latin-1 bytes for "ação", not valid UTF-8
pub const LATIN1_BYTES: &[u8] = &[b'a', 0xE7, 0xE3, b'o', b'\n'];
