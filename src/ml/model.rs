use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; do NOT add them again or you get conflicting impls.
//
// This config is also the stable hyperparameter summary: anything that
// wants to log the architecture reads it from here instead of reaching
// into module internals.
#[derive(Config, Debug)]
pub struct Bert4RecConfig {
    pub num_items:  usize,
    pub seq_len:    usize,
    pub d_model:    usize,
    pub num_heads:  usize,
    pub num_layers: usize,
    pub d_ff:       usize,
    pub dropout:    f64,
}

impl Bert4RecConfig {
    /// Real items occupy ids 1..=num_items; 0 is padding and
    /// num_items + 1 is the mask token, so the embedding table and
    /// the output head both cover num_items + 2 ids.
    pub fn vocab_size(&self) -> usize {
        self.num_items + 2
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> Bert4Rec<B> {
        let vocab_size = self.vocab_size();
        let item_embedding     = EmbeddingConfig::new(vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.seq_len, self.d_model).init(device);
        let blocks: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let output     = LinearConfig::new(self.d_model, vocab_size).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        Bert4Rec {
            item_embedding, position_embedding, blocks,
            final_norm, output, dropout,
            seq_len: self.seq_len,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        // Padded positions are excluded from attention as keys.
        let attn_output = self
            .self_attn
            .forward(MhaInput::self_attn(x.clone()).mask_pad(pad_mask))
            .context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// Bidirectional transformer encoder over masked item sequences.
/// Predicts, for every position, a distribution over the full item
/// vocabulary (plus the padding and mask ids).
#[derive(Module, Debug)]
pub struct Bert4Rec<B: Backend> {
    pub item_embedding:     Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub blocks:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub output:             Linear<B>,
    pub dropout:            Dropout,
    pub seq_len:            usize,
}

impl<B: Backend> Bert4Rec<B> {
    /// input_ids: [batch, seq_len], pad_mask: true where input is padding.
    /// Returns logits of shape [batch, seq_len, num_items + 2].
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        pad_mask:  Tensor<B, 2, Bool>,
    ) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();

        let item_emb = self.item_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &item_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(item_emb + pos_emb);
        for block in &self.blocks {
            x = block.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        self.output.forward(x) // [batch, seq_len, num_items + 2]
    }
}
