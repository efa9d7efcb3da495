use crate::models::GenerationRequest;

/// 构建生成题目的提示词
pub fn build_question_prompt(request: &GenerationRequest) -> String {
    let n = request.question_count;
    format!(
        r#"A partir del siguiente fragmento de texto, genera un objeto JSON que represente un cuestionario de {n} preguntas de opción múltiple.
Cada pregunta debe ser un objeto con las siguientes propiedades:
- "question": una cadena de texto con la pregunta.
- "options": un array de 4 cadenas de texto con las opciones de respuesta.
- "correctAnswer": una cadena de texto que sea exactamente igual a una de las opciones y represente la respuesta correcta.
- "justification": una cadena de texto que explique brevemente por qué la respuesta correcta es correcta, basándose en el texto proporcionado.
El resultado final debe ser un array de estos {n} objetos de pregunta, formateado como una cadena JSON válida.
No incluyas ninguna explicación adicional fuera del JSON. No uses bloques de código markdown como ```json al principio o al final de tu respuesta. Solo el JSON puro.

Fragmento de Texto:
{chunk}"#,
        n = n,
        chunk = request.text_chunk
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_count_and_chunk() {
        let prompt = build_question_prompt(&GenerationRequest {
            text_chunk: "La fotosíntesis ocurre en los cloroplastos.".to_string(),
            question_count: 3,
        });
        assert!(prompt.contains("cuestionario de 3 preguntas"));
        assert!(prompt.contains("array de estos 3 objetos"));
        assert!(prompt.ends_with("La fotosíntesis ocurre en los cloroplastos."));
    }
}
