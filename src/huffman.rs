//! Canonical Huffman code tree used for entropy decoding.
//!
//! Built from the `(code_lengths, values)` pair a DHT segment carries.
//! Represented as an arena of fixed-size nodes addressed by index rather
//! than individually heap-allocated nodes: the tree has no cycles and its
//! lifetime is exactly the lifetime of the table, so there is nothing for
//! reference counting to buy us.
use crate::errors::DecodeErrors;

const ROOT: u32 = 0;

#[derive(Clone, Copy, Default)]
struct Node {
    /// Index of the child reached by a 0 bit, or `None` if absent.
    left: Option<u32>,
    /// Index of the child reached by a 1 bit, or `None` if absent.
    right: Option<u32>,
    /// The decoded symbol, if this node is a leaf.
    leaf: Option<u8>,
}

/// A canonical Huffman decode tree built from one DHT table entry.
pub struct HuffmanTree {
    nodes: Vec<Node>,
}

impl HuffmanTree {
    /// Builds the canonical tree for the given per-length code counts and
    /// the values to assign, in order, to codes as they are generated
    /// (shortest codes first, then left-to-right within a length).
    pub fn build(code_lengths: &[u8; 16], values: &[u8]) -> Result<Self, DecodeErrors> {
        let total: usize = code_lengths.iter().map(|&n| n as usize).sum();
        if total != values.len() {
            return Err(DecodeErrors::BadTable(format!(
                "DHT declared {total} codes but supplied {} values",
                values.len()
            )));
        }

        let mut tree = HuffmanTree {
            nodes: vec![Node::default()],
        };

        let mut value_iter = values.iter();
        // `code` is built incrementally per the standard canonical
        // assignment: start at 0, double (shift left) when moving to the
        // next bit length, increment after every code emitted at the
        // current length.
        let mut code: u32 = 0;

        for (length_minus_one, &count) in code_lengths.iter().enumerate() {
            let length = (length_minus_one + 1) as u8;
            for _ in 0..count {
                let value = *value_iter.next().expect("count already validated above");
                tree.insert(code, length, value)?;
                code += 1;
            }
            code <<= 1;
        }

        Ok(tree)
    }

    fn insert(&mut self, code: u32, length: u8, value: u8) -> Result<(), DecodeErrors> {
        let mut node_idx = ROOT;
        for bit_pos in (0..length).rev() {
            let bit = (code >> bit_pos) & 1;
            let existing_leaf = self.nodes[node_idx as usize].leaf;
            if existing_leaf.is_some() {
                return Err(DecodeErrors::BadTable(
                    "Huffman table is overfull: a shorter code prefixes a longer one".into(),
                ));
            }
            let child = if bit == 0 {
                self.nodes[node_idx as usize].left
            } else {
                self.nodes[node_idx as usize].right
            };
            node_idx = match child {
                Some(idx) => idx,
                None => {
                    self.nodes.push(Node::default());
                    let new_idx = (self.nodes.len() - 1) as u32;
                    if bit == 0 {
                        self.nodes[node_idx as usize].left = Some(new_idx);
                    } else {
                        self.nodes[node_idx as usize].right = Some(new_idx);
                    }
                    new_idx
                }
            };
        }
        let leaf = &mut self.nodes[node_idx as usize];
        if leaf.leaf.is_some() || leaf.left.is_some() || leaf.right.is_some() {
            return Err(DecodeErrors::BadTable(
                "Huffman table is overfull: two codes collide at the same leaf".into(),
            ));
        }
        leaf.leaf = Some(value);
        Ok(())
    }

    /// Decodes one symbol by pulling bits from `reader` one at a time
    /// until a leaf is reached.
    pub fn decode_symbol(
        &self,
        reader: &mut crate::bitreader::BitReader,
    ) -> Result<u8, DecodeErrors> {
        let mut node_idx = ROOT;
        loop {
            let bit = reader.read_bit()?;
            let node = &self.nodes[node_idx as usize];
            let next = if bit == 0 { node.left } else { node.right };
            match next {
                None => {
                    return Err(DecodeErrors::BadEntropy(
                        "entropy stream used a code not defined in the Huffman table".into(),
                    ))
                }
                Some(idx) => {
                    node_idx = idx;
                }
            }
            if let Some(symbol) = self.nodes[node_idx as usize].leaf {
                return Ok(symbol);
            }
        }
    }
}
